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

use serde::{Deserialize, Serialize};

use crate::preferences::DeviceType;
use crate::provider::TrackKind;

/// Device categories reported by the platform's enumeration call.
///
/// Serialized with the browser's `MediaDeviceKind` spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "audioinput")]
    AudioInput,
    #[serde(rename = "videoinput")]
    VideoInput,
    #[serde(rename = "audiooutput")]
    AudioOutput,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 3] = [
        DeviceKind::AudioInput,
        DeviceKind::VideoInput,
        DeviceKind::AudioOutput,
    ];

    /// The preference slot a selected device of this kind is stored under.
    pub fn preference_slot(self) -> DeviceType {
        match self {
            DeviceKind::AudioInput => DeviceType::Audio,
            DeviceKind::VideoInput => DeviceType::Video,
            DeviceKind::AudioOutput => DeviceType::AudioOutput,
        }
    }

    /// The input kind that produces tracks of `kind`.
    pub fn input_for(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Audio => DeviceKind::AudioInput,
            TrackKind::Video => DeviceKind::VideoInput,
        }
    }
}

/// One entry of the platform's device list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub device_id: String,
    pub kind: DeviceKind,
    pub label: String,
    #[serde(default)]
    pub group_id: String,
}

impl DeviceDescriptor {
    pub fn new(device_id: impl Into<String>, kind: DeviceKind, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
            label: label.into(),
            group_id: String::new(),
        }
    }

    /// Case-insensitive label match.
    pub fn label_contains(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Browsers report entries with an empty id until permission is granted; those can not be
    /// selected.
    pub fn is_selectable(&self) -> bool {
        !self.device_id.is_empty()
    }
}

/// The cached result of the last enumeration.
///
/// Keeps the raw list as reported and hands out per-kind views that only contain selectable
/// entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceList {
    devices: Vec<DeviceDescriptor>,
}

impl DeviceList {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self { devices }
    }

    /// The raw list, including entries without an id.
    pub fn all(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Selectable devices of `kind`, in enumeration order.
    pub fn of_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &DeviceDescriptor> {
        self.devices
            .iter()
            .filter(move |device| device.kind == kind && device.is_selectable())
    }

    pub fn audio_inputs(&self) -> Vec<DeviceDescriptor> {
        self.of_kind(DeviceKind::AudioInput).cloned().collect()
    }

    pub fn video_inputs(&self) -> Vec<DeviceDescriptor> {
        self.of_kind(DeviceKind::VideoInput).cloned().collect()
    }

    pub fn audio_outputs(&self) -> Vec<DeviceDescriptor> {
        self.of_kind(DeviceKind::AudioOutput).cloned().collect()
    }

    pub fn first(&self, kind: DeviceKind) -> Option<&DeviceDescriptor> {
        self.of_kind(kind).next()
    }

    /// First selectable device of `kind` whose label contains `needle`, ignoring case.
    pub fn find_labeled(&self, kind: DeviceKind, needle: &str) -> Option<&DeviceDescriptor> {
        self.of_kind(kind).find(|device| device.label_contains(needle))
    }

    pub fn contains(&self, kind: DeviceKind, device_id: &str) -> bool {
        self.of_kind(kind).any(|device| device.device_id == device_id)
    }

    fn ids(&self, kind: DeviceKind) -> Vec<&str> {
        self.of_kind(kind).map(|d| d.device_id.as_str()).collect()
    }

    /// True when any per-kind id list differs from `other`'s, order included.
    pub fn differs_from(&self, other: &DeviceList) -> bool {
        DeviceKind::ALL
            .iter()
            .any(|kind| self.ids(*kind) != other.ids(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceList {
        DeviceList::new(vec![
            DeviceDescriptor::new("mic-1", DeviceKind::AudioInput, "Built-in Microphone"),
            DeviceDescriptor::new("", DeviceKind::AudioInput, ""),
            DeviceDescriptor::new("cam-1", DeviceKind::VideoInput, "FaceTime HD Camera"),
            DeviceDescriptor::new("spk-1", DeviceKind::AudioOutput, "Speakers"),
        ])
    }

    #[test]
    fn test_kind_views_skip_empty_ids() {
        let list = sample();
        assert_eq!(list.all().len(), 4);
        assert_eq!(list.audio_inputs().len(), 1);
        assert_eq!(list.video_inputs().len(), 1);
        assert_eq!(list.audio_outputs().len(), 1);
        assert!(list
            .audio_inputs()
            .iter()
            .all(|d| d.kind == DeviceKind::AudioInput && !d.device_id.is_empty()));
    }

    #[test]
    fn test_find_labeled_ignores_case() {
        let list = sample();
        let found = list.find_labeled(DeviceKind::VideoInput, "facetime");
        assert_eq!(found.map(|d| d.device_id.as_str()), Some("cam-1"));
        assert!(list.find_labeled(DeviceKind::VideoInput, "back").is_none());
    }

    #[test]
    fn test_differs_from_detects_added_device() {
        let before = sample();
        let mut devices = before.all().to_vec();
        devices.push(DeviceDescriptor::new("mic-2", DeviceKind::AudioInput, "USB Mic"));
        let after = DeviceList::new(devices);
        assert!(after.differs_from(&before));
        assert!(!before.differs_from(&sample()));
    }

    #[test]
    fn test_descriptor_uses_browser_kind_names() {
        let json = serde_json::to_value(DeviceDescriptor::new(
            "cam-1",
            DeviceKind::VideoInput,
            "Camera",
        ))
        .unwrap();
        assert_eq!(json["kind"], "videoinput");
        assert_eq!(json["deviceId"], "cam-1");
    }
}
