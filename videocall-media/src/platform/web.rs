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

//! Browser media platform backed by `navigator.mediaDevices`.

use async_trait::async_trait;
use gloo_utils::window;
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    DomException, MediaDeviceInfo, MediaDeviceKind, MediaStreamConstraints, MediaStreamTrack,
    MediaStreamTrackState, MediaTrackConstraints,
};

use crate::constraints::{MediaConstraints, TrackConstraint};
use crate::error::{MediaError, Result};
use crate::media_devices::{DeviceDescriptor, DeviceKind};
use crate::provider::{MediaDevicesProvider, MediaStream, MediaTrack, TrackKind};

/// A `MediaStreamTrack` handle.
#[derive(Clone, Debug)]
pub struct BrowserTrack(MediaStreamTrack);

impl BrowserTrack {
    /// The underlying track, e.g. for `RTCRtpSender.replaceTrack()`.
    pub fn inner(&self) -> &MediaStreamTrack {
        &self.0
    }
}

impl MediaTrack for BrowserTrack {
    fn id(&self) -> String {
        self.0.id()
    }

    fn kind(&self) -> TrackKind {
        if self.0.kind() == "audio" {
            TrackKind::Audio
        } else {
            TrackKind::Video
        }
    }

    fn label(&self) -> String {
        self.0.label()
    }

    fn enabled(&self) -> bool {
        self.0.enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        self.0.set_enabled(enabled);
    }

    fn stop(&self) {
        self.0.stop();
    }

    fn is_live(&self) -> bool {
        self.0.ready_state() == MediaStreamTrackState::Live
    }
}

/// [`MediaDevicesProvider`] for the browser.
#[derive(Clone, Debug, Default)]
pub struct BrowserMediaDevices;

impl BrowserMediaDevices {
    pub fn new() -> Self {
        Self
    }

    fn media_devices() -> Result<web_sys::MediaDevices> {
        window()
            .navigator()
            .media_devices()
            .map_err(|e| MediaError::Unsupported(format!("navigator.mediaDevices: {e:?}")))
    }

    /// Installs (or with `None`, clears) the `devicechange` handler. Hosts typically call
    /// [`MediaSessionManager::refresh_devices`](crate::MediaSessionManager::refresh_devices)
    /// from it.
    pub fn set_device_change_handler(&self, handler: Option<&js_sys::Function>) -> Result<()> {
        Self::media_devices()?.set_ondevicechange(handler);
        Ok(())
    }
}

#[async_trait(?Send)]
impl MediaDevicesProvider for BrowserMediaDevices {
    type Track = BrowserTrack;

    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>> {
        let promise = Self::media_devices()?
            .enumerate_devices()
            .map_err(|e| MediaError::EnumerationFailed(format!("{e:?}")))?;
        let devices = JsFuture::from(promise)
            .await
            .map_err(|e| MediaError::EnumerationFailed(format!("{e:?}")))?
            .unchecked_into::<Array>();

        Ok(devices
            .iter()
            .map(|d| d.unchecked_into::<MediaDeviceInfo>())
            .filter_map(|info| descriptor_from_info(&info))
            .collect())
    }

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream<BrowserTrack>> {
        let promise = Self::media_devices()?
            .get_user_media_with_constraints(&build_constraints(constraints)?)
            .map_err(acquisition_error)?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(acquisition_error)?
            .unchecked_into::<web_sys::MediaStream>();

        log::info!(
            "getUserMedia OK, stream id={}, tracks={}",
            stream.id(),
            stream.get_tracks().length()
        );

        let tracks = stream
            .get_tracks()
            .iter()
            .map(|track| BrowserTrack(track.unchecked_into::<MediaStreamTrack>()))
            .collect();
        Ok(MediaStream::new(stream.id(), tracks))
    }
}

/// Builds a `web_sys::MediaStream` holding the same tracks, for `HtmlMediaElement.srcObject`.
pub fn to_web_stream(stream: &MediaStream<BrowserTrack>) -> Result<web_sys::MediaStream> {
    let tracks: Array = stream
        .tracks()
        .iter()
        .map(|t| JsValue::from(t.inner().clone()))
        .collect();
    web_sys::MediaStream::new_with_tracks(&tracks)
        .map_err(|e| MediaError::AcquisitionFailed(format!("{e:?}")))
}

/// Translates [`MediaConstraints`] into the `getUserMedia` argument.
///
/// `Any(b)` becomes a plain boolean, `Exact(id)` becomes `{ deviceId: { exact: id } }` so the
/// browser fails instead of quietly picking another device.
pub fn build_constraints(constraints: &MediaConstraints) -> Result<MediaStreamConstraints> {
    let media = MediaStreamConstraints::new();
    media.set_audio(&track_constraint(&constraints.audio)?);
    media.set_video(&track_constraint(&constraints.video)?);
    Ok(media)
}

fn track_constraint(constraint: &TrackConstraint) -> Result<JsValue> {
    match constraint {
        TrackConstraint::Any(requested) => Ok(JsValue::from_bool(*requested)),
        TrackConstraint::Exact(device_id) => {
            let exact = Object::new();
            Reflect::set(
                &exact,
                &JsValue::from_str("exact"),
                &JsValue::from_str(device_id),
            )
            .map_err(|e| MediaError::AcquisitionFailed(format!("{e:?}")))?;
            log::debug!("deviceId.exact = {device_id}");
            let track = MediaTrackConstraints::new();
            track.set_device_id(&exact.into());
            Ok(track.into())
        }
    }
}

fn descriptor_from_info(info: &MediaDeviceInfo) -> Option<DeviceDescriptor> {
    let kind = match info.kind() {
        MediaDeviceKind::Audioinput => DeviceKind::AudioInput,
        MediaDeviceKind::Videoinput => DeviceKind::VideoInput,
        MediaDeviceKind::Audiooutput => DeviceKind::AudioOutput,
        _ => return None,
    };
    Some(DeviceDescriptor {
        device_id: info.device_id(),
        kind,
        label: info.label(),
        group_id: info.group_id(),
    })
}

fn acquisition_error(e: JsValue) -> MediaError {
    match e.dyn_ref::<DomException>() {
        Some(ex) if ex.name() == "NotAllowedError" || ex.name() == "SecurityError" => {
            MediaError::PermissionDenied(ex.message())
        }
        Some(ex) => MediaError::AcquisitionFailed(format!("{}: {}", ex.name(), ex.message())),
        None => MediaError::AcquisitionFailed(format!("{e:?}")),
    }
}
