/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Picks the devices a fresh session starts with.

use log::{info, warn};

use super::{DeviceKind, DeviceList};
use crate::constants::{BACK_CAMERA_LABEL, ENVIRONMENT_CAMERA_LABEL};
use crate::preferences::PreferenceState;

/// Device ids chosen for the first acquisition. `None` means no device of that kind exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedDevices {
    pub audio: Option<String>,
    pub video: Option<String>,
    pub audio_output: Option<String>,
}

/// Resolves the starting devices from the stored preferences and the enumerated list.
///
/// Camera selection:
/// 1. the stored camera, unless `prefer_environment_camera` is set and a camera labeled
///    "environment" exists, in which case that one wins;
/// 2. otherwise the first camera labeled "back", then "environment";
/// 3. otherwise the first camera.
///
/// Microphone and speaker fall back independently to the first device of their kind.
pub fn resolve_default_devices(
    devices: &DeviceList,
    preferences: &PreferenceState,
    prefer_environment_camera: bool,
) -> ResolvedDevices {
    let mut video = non_empty(preferences.video.as_deref());

    if prefer_environment_camera {
        match devices.find_labeled(DeviceKind::VideoInput, ENVIRONMENT_CAMERA_LABEL) {
            Some(camera) => {
                info!("Using environment camera: {}", camera.label);
                video = Some(camera.device_id.clone());
            }
            None => info!("Environment camera not found"),
        }
    }

    if video.is_none() {
        let back_camera = devices
            .find_labeled(DeviceKind::VideoInput, BACK_CAMERA_LABEL)
            .or_else(|| devices.find_labeled(DeviceKind::VideoInput, ENVIRONMENT_CAMERA_LABEL));

        match back_camera {
            Some(camera) => {
                info!("Using back camera: {}", camera.label);
                video = Some(camera.device_id.clone());
            }
            None => {
                video = first_id(devices, DeviceKind::VideoInput);
                match &video {
                    Some(id) => info!("Using default camera: {id}"),
                    None => warn!("No video input found."),
                }
            }
        }
    }

    let audio = non_empty(preferences.audio.as_deref()).or_else(|| {
        let first = first_id(devices, DeviceKind::AudioInput);
        if first.is_none() {
            warn!("No audio input found.");
        }
        first
    });

    let audio_output = non_empty(preferences.audio_output.as_deref()).or_else(|| {
        let first = first_id(devices, DeviceKind::AudioOutput);
        if first.is_none() {
            warn!("No audio output found.");
        }
        first
    });

    ResolvedDevices {
        audio,
        video,
        audio_output,
    }
}

fn non_empty(id: Option<&str>) -> Option<String> {
    id.filter(|id| !id.is_empty()).map(str::to_string)
}

fn first_id(devices: &DeviceList, kind: DeviceKind) -> Option<String> {
    devices.first(kind).map(|device| device.device_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_devices::DeviceDescriptor;

    fn camera(id: &str, label: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(id, DeviceKind::VideoInput, label)
    }

    #[test]
    fn test_back_label_wins_without_environment_preference() {
        let devices = DeviceList::new(vec![
            camera("front", "Integrated Front Camera"),
            camera("usb-back", "USB Back Camera"),
        ]);
        let resolved = resolve_default_devices(&devices, &PreferenceState::default(), false);
        assert_eq!(resolved.video.as_deref(), Some("usb-back"));
    }

    #[test]
    fn test_first_camera_when_no_rear_label() {
        let devices = DeviceList::new(vec![
            camera("cam-a", "HD Webcam"),
            camera("cam-b", "Virtual Camera"),
        ]);
        let resolved = resolve_default_devices(&devices, &PreferenceState::default(), false);
        assert_eq!(resolved.video.as_deref(), Some("cam-a"));
    }

    #[test]
    fn test_environment_preference_overrides_stored_camera() {
        let devices = DeviceList::new(vec![
            camera("front", "camera2 1, facing front"),
            camera("rear", "camera2 0, facing environment"),
        ]);
        let stored = PreferenceState {
            video: Some("front".to_string()),
            ..Default::default()
        };
        let resolved = resolve_default_devices(&devices, &stored, true);
        assert_eq!(resolved.video.as_deref(), Some("rear"));
    }

    #[test]
    fn test_stored_camera_kept_without_environment_preference() {
        let devices = DeviceList::new(vec![
            camera("front", "Front Camera"),
            camera("rear", "Back Camera"),
        ]);
        let stored = PreferenceState {
            video: Some("front".to_string()),
            ..Default::default()
        };
        let resolved = resolve_default_devices(&devices, &stored, false);
        assert_eq!(resolved.video.as_deref(), Some("front"));
    }

    #[test]
    fn test_environment_label_used_as_back_fallback() {
        let devices = DeviceList::new(vec![
            camera("front", "Front"),
            camera("rear", "Facing ENVIRONMENT"),
        ]);
        let resolved = resolve_default_devices(&devices, &PreferenceState::default(), false);
        assert_eq!(resolved.video.as_deref(), Some("rear"));
    }

    #[test]
    fn test_audio_and_output_fall_back_independently() {
        let devices = DeviceList::new(vec![
            DeviceDescriptor::new("mic-1", DeviceKind::AudioInput, "Mic"),
            DeviceDescriptor::new("spk-1", DeviceKind::AudioOutput, "Speaker"),
            DeviceDescriptor::new("spk-2", DeviceKind::AudioOutput, "Headphones"),
        ]);
        let stored = PreferenceState {
            audio_output: Some("spk-2".to_string()),
            ..Default::default()
        };
        let resolved = resolve_default_devices(&devices, &stored, false);
        assert_eq!(resolved.audio.as_deref(), Some("mic-1"));
        assert_eq!(resolved.audio_output.as_deref(), Some("spk-2"));
        assert_eq!(resolved.video, None);
    }
}
