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

mod options;
mod state;

use std::cell::RefCell;
use std::rc::Rc;

use async_broadcast::Receiver;
use futures::lock::Mutex;
use log::{error, info, warn};

pub use options::{MediaSessionOptions, ToggleOrder};
pub use state::{MediaSessionSnapshot, SessionPhase, SwitchInputResult};

use state::SessionState;

use crate::constraints::{MediaConstraints, TrackConstraint};
use crate::error::{MediaError, Result};
use crate::event_bus::EventBus;
use crate::events::MediaEvent;
use crate::media_devices::{
    request_access, resolve_default_devices, DeviceDescriptor, DeviceKind, DeviceList,
    PermissionResult,
};
use crate::preferences::{DeviceType, PreferenceStore};
use crate::provider::{MediaDevicesProvider, MediaStream, TrackKind};

/// [MediaSessionManager] owns the local camera/microphone streams of one call participant.
///
/// It probes permission, enumerates devices, picks starting devices, acquires the stream and
/// swaps devices while the call is running. Device choices and the mute / video-off flags are
/// read from and written to the shared [PreferenceStore]; the manager never persists anything
/// itself.
///
/// Outline of usage:
///
/// ```ignore
/// let preferences = Rc::new(PreferenceStore::new(LocalStorage::new()));
/// let session = MediaSessionManager::new(
///     BrowserMediaDevices::new(),
///     Rc::clone(&preferences),
///     MediaSessionOptions::default(),
/// );
///
/// session.start().await?;
///
/// let cameras = session.video_devices();
/// if let Some(switched) = session.switch_input(&cameras[1].device_id, TrackKind::Video).await? {
///     // hand switched.new_video_track to the encoder / peer connection
/// }
/// session.toggle_mute();
/// session.stop_all_streaming();
/// ```
///
/// The caller must stop the streams (see [`stop_all_streaming`](Self::stop_all_streaming)) before
/// dropping the manager; dropping it does not release the hardware.
pub struct MediaSessionManager<P: MediaDevicesProvider> {
    provider: P,
    preferences: Rc<PreferenceStore>,
    options: MediaSessionOptions,
    state: RefCell<SessionState<P::Track>>,
    // Held across every acquisition that replaces the active stream.
    stream_lock: Mutex<()>,
    events: EventBus,
}

impl<P: MediaDevicesProvider> MediaSessionManager<P> {
    pub fn new(provider: P, preferences: Rc<PreferenceStore>, options: MediaSessionOptions) -> Self {
        Self {
            provider,
            preferences,
            options,
            state: RefCell::new(SessionState::new()),
            stream_lock: Mutex::new(()),
            events: EventBus::new(),
        }
    }

    /// Brings the session up: checks (and if needed requests) permission, enumerates devices,
    /// resolves the starting devices and acquires the first stream.
    ///
    /// Does nothing past the permission step if a stream was already acquired. Resolved device
    /// ids are written to the preference store before the acquisition is issued. Overlapping
    /// calls acquire at most one stream.
    pub async fn start(&self) -> Result<()> {
        let permission = self.check_permission().await;
        if !permission.is_granted() {
            self.request_permission().await?;
        }
        if !self.access_granted() {
            return Ok(());
        }

        let _guard = self.stream_lock.lock().await;
        if self.state.borrow().stream.is_some() {
            return Ok(());
        }

        let devices = DeviceList::new(self.get_devices().await);
        if devices.is_empty() {
            info!("No devices found");
            return Ok(());
        }

        let resolved = resolve_default_devices(
            &devices,
            &self.preferences.get_state(),
            self.options.prefer_environment_camera,
        );

        if let Some(video) = &resolved.video {
            self.preferences.set(video.clone(), DeviceType::Video);
        }
        if let Some(audio) = &resolved.audio {
            self.preferences.set(audio.clone(), DeviceType::Audio);
        }
        if let Some(audio_output) = &resolved.audio_output {
            self.preferences.set(audio_output.clone(), DeviceType::AudioOutput);
        }

        let stream = self
            .acquire_active(MediaConstraints {
                audio: TrackConstraint::device_or_any(resolved.audio.as_deref()),
                video: TrackConstraint::device_or_any(resolved.video.as_deref()),
            })
            .await?;
        self.state.borrow_mut().stream = Some(stream);
        Ok(())
    }

    /// Probes permission with a throwaway acquisition of any camera and microphone.
    ///
    /// Never fails: a rejected acquisition is logged and reported as `{video: false, audio: false}`.
    pub async fn check_permission(&self) -> PermissionResult {
        let result = request_access(&self.provider).await;

        let mut state = self.state.borrow_mut();
        state.advance(SessionPhase::PermissionChecked);
        match result {
            Ok(()) => {
                state.access_granted = true;
                drop(state);
                self.events.emit(MediaEvent::PermissionGranted);
                PermissionResult::granted()
            }
            Err(e) => {
                error!("Error checking permission: {e}");
                state.access_granted = false;
                drop(state);
                self.events.emit(MediaEvent::PermissionDenied(e.to_string()));
                PermissionResult::denied()
            }
        }
    }

    /// Triggers the platform's permission prompt, then re-runs [`check_permission`](Self::check_permission).
    pub async fn request_permission(&self) -> Result<PermissionResult> {
        request_access(&self.provider).await?;
        Ok(self.check_permission().await)
    }

    /// Enumerates every device and replaces the cached list.
    ///
    /// Returns the raw list, which may be empty; an enumeration failure is logged and treated as
    /// an empty list.
    pub async fn get_devices(&self) -> Vec<DeviceDescriptor> {
        let devices = match self.provider.enumerate_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                warn!("Failed to enumerate devices: {e}");
                Vec::new()
            }
        };

        {
            let mut state = self.state.borrow_mut();
            state.devices = DeviceList::new(devices.clone());
            state.advance(SessionPhase::DevicesEnumerated);
        }
        self.events.emit(MediaEvent::DevicesLoaded(devices.len()));
        devices
    }

    /// Re-enumerates after a hot-plug and repairs stale selections.
    ///
    /// A stored device that disappeared is replaced by the first remaining device of its kind.
    /// Returns true if the per-kind device lists changed.
    pub async fn refresh_devices(&self) -> bool {
        let previous = self.state.borrow().devices.clone();
        let devices = DeviceList::new(self.get_devices().await);
        let changed = devices.differs_from(&previous);

        for kind in DeviceKind::ALL {
            let slot = kind.preference_slot();
            let Some(selected) = self.preferences.selected(slot) else {
                continue;
            };
            if devices.contains(kind, &selected) {
                continue;
            }
            if let Some(fallback) = devices.first(kind) {
                info!(
                    "Selected {kind:?} device {selected} disappeared, falling back to {}",
                    fallback.label
                );
                self.preferences.set(fallback.device_id.clone(), slot);
            }
        }

        if changed {
            self.events.emit(MediaEvent::DevicesChanged);
        }
        changed
    }

    /// Acquires a stream and makes it the active one.
    ///
    /// Track `enabled` flags follow the current mute / video-off preferences. A previously
    /// active stream is stopped once the new one is in hand. Acquisition errors are returned
    /// unchanged.
    pub async fn update_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<MediaStream<P::Track>> {
        let _guard = self.stream_lock.lock().await;
        self.acquire_active(constraints).await
    }

    /// Switches one input to `device_id`, keeping the other input on its stored device.
    ///
    /// Returns `Ok(None)`, leaving the preferences untouched, when there is no active stream
    /// with both an audio and a video track. The previous stream is stopped only after the new
    /// one is acquired, so the call never goes without a live track. Overlapping calls run one
    /// after the other.
    pub async fn switch_input(
        &self,
        device_id: &str,
        kind: TrackKind,
    ) -> Result<Option<SwitchInputResult<P::Track>>> {
        let _guard = self.stream_lock.lock().await;

        let current = self.state.borrow().active_stream.clone();
        let Some(previous) = current else {
            warn!("Cannot switch {kind} input: no active stream");
            return Ok(None);
        };
        let (Some(old_video_track), Some(old_audio_track)) = (
            previous.first_track(TrackKind::Video),
            previous.first_track(TrackKind::Audio),
        ) else {
            warn!("Cannot switch {kind} input: active stream is missing a track");
            return Ok(None);
        };

        let requested = TrackConstraint::from(device_id);
        let constraints = match kind {
            TrackKind::Audio => MediaConstraints {
                audio: requested,
                video: TrackConstraint::device_or_any(self.preferences.video().as_deref()),
            },
            TrackKind::Video => MediaConstraints {
                audio: TrackConstraint::device_or_any(self.preferences.audio().as_deref()),
                video: requested,
            },
        };

        let new_stream = self.provider.get_user_media(&constraints).await?;
        let (new_video_track, new_audio_track) = match (
            new_stream.first_track(TrackKind::Video),
            new_stream.first_track(TrackKind::Audio),
        ) {
            (Some(video), Some(audio)) => (video, audio),
            (None, _) => {
                new_stream.stop();
                return Err(MediaError::MissingTrack(TrackKind::Video));
            }
            (_, None) => {
                new_stream.stop();
                return Err(MediaError::MissingTrack(TrackKind::Audio));
            }
        };

        self.apply_preferences(&new_stream);
        previous.stop();
        self.state.borrow_mut().active_stream = Some(new_stream.clone());
        self.preferences
            .set(device_id, DeviceKind::input_for(kind).preference_slot());

        info!("Switched {kind} input to {device_id}");
        self.events.emit(MediaEvent::InputSwitched {
            kind,
            device_id: device_id.to_string(),
        });

        Ok(Some(SwitchInputResult {
            old_video_track,
            new_video_track,
            old_audio_track,
            new_audio_track,
            new_stream,
        }))
    }

    /// Stores the preferred speaker. Routing audio to it is up to the caller, e.g. via
    /// `HtmlMediaElement.setSinkId()`.
    pub fn switch_audio_output(&self, device_id: &str) {
        self.preferences.set(device_id, DeviceType::AudioOutput);
        self.events
            .emit(MediaEvent::AudioOutputChanged(device_id.to_string()));
    }

    /// Flips the mute preference and enables / disables the active audio tracks to match.
    pub fn toggle_mute(&self) {
        self.toggle(TrackKind::Audio);
        self.events.emit(MediaEvent::MuteChanged(self.preferences.muted()));
    }

    /// Flips the video-off preference and enables / disables the active video tracks to match.
    pub fn toggle_video(&self) {
        self.toggle(TrackKind::Video);
        self.events
            .emit(MediaEvent::VideoOffChanged(self.preferences.video_off()));
    }

    /// Stops every track of `stream`. No-op for `None`.
    pub fn stop_streaming(&self, stream: Option<&MediaStream<P::Track>>) {
        if let Some(stream) = stream {
            stream.stop();
        }
    }

    /// Stops every track of the first stream acquired by [`start`](Self::start).
    pub fn stop_all_streaming(&self) {
        let stream = self.state.borrow().stream.clone();
        self.stop_streaming(stream.as_ref());
    }

    pub fn subscribe_events(&self) -> Receiver<MediaEvent> {
        self.events.subscribe()
    }

    /// The first stream acquired by [`start`](Self::start).
    pub fn stream(&self) -> Option<MediaStream<P::Track>> {
        self.state.borrow().stream.clone()
    }

    /// The stream currently feeding the call.
    pub fn active_stream(&self) -> Option<MediaStream<P::Track>> {
        self.state.borrow().active_stream.clone()
    }

    /// The raw list from the last enumeration.
    pub fn devices(&self) -> Vec<DeviceDescriptor> {
        self.state.borrow().devices.all().to_vec()
    }

    pub fn audio_devices(&self) -> Vec<DeviceDescriptor> {
        self.state.borrow().devices.audio_inputs()
    }

    pub fn video_devices(&self) -> Vec<DeviceDescriptor> {
        self.state.borrow().devices.video_inputs()
    }

    pub fn output_devices(&self) -> Vec<DeviceDescriptor> {
        self.state.borrow().devices.audio_outputs()
    }

    pub fn selected_audio_device(&self) -> Option<String> {
        self.preferences.audio()
    }

    pub fn selected_video_device(&self) -> Option<String> {
        self.preferences.video()
    }

    pub fn selected_output_device(&self) -> Option<String> {
        self.preferences.audio_output()
    }

    pub fn ready(&self) -> bool {
        self.state.borrow().ready
    }

    pub fn access_granted(&self) -> bool {
        self.state.borrow().access_granted
    }

    pub fn muted(&self) -> bool {
        self.preferences.muted()
    }

    pub fn video_off(&self) -> bool {
        self.preferences.video_off()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    pub fn preferences(&self) -> &Rc<PreferenceStore> {
        &self.preferences
    }

    pub fn options(&self) -> &MediaSessionOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn snapshot(&self) -> MediaSessionSnapshot<P::Track> {
        let preferences = self.preferences.get_state();
        let state = self.state.borrow();
        MediaSessionSnapshot {
            stream: state.stream.clone(),
            active_stream: state.active_stream.clone(),
            audio_devices: state.devices.audio_inputs(),
            video_devices: state.devices.video_inputs(),
            output_devices: state.devices.audio_outputs(),
            selected_audio_device: preferences.audio,
            selected_video_device: preferences.video,
            selected_output_device: preferences.audio_output,
            ready: state.ready,
            access_granted: state.access_granted,
            muted: preferences.muted,
            video_off: preferences.video_off,
            phase: state.phase,
        }
    }

    // Caller holds `stream_lock`.
    async fn acquire_active(
        &self,
        constraints: MediaConstraints,
    ) -> Result<MediaStream<P::Track>> {
        let stream = self.provider.get_user_media(&constraints).await?;
        self.apply_preferences(&stream);

        let previous = {
            let mut state = self.state.borrow_mut();
            state.ready = true;
            state.advance(SessionPhase::StreamAcquired);
            state.active_stream.replace(stream.clone())
        };
        if let Some(previous) = previous.filter(|previous| previous.id() != stream.id()) {
            previous.stop();
        }

        self.events.emit(MediaEvent::StreamAcquired {
            stream_id: stream.id().to_string(),
        });
        Ok(stream)
    }

    fn apply_preferences(&self, stream: &MediaStream<P::Track>) {
        let preferences = self.preferences.get_state();
        stream.set_enabled(TrackKind::Video, !preferences.video_off);
        stream.set_enabled(TrackKind::Audio, !preferences.muted);
    }

    fn toggle(&self, kind: TrackKind) {
        let flag = |store: &PreferenceStore| match kind {
            TrackKind::Audio => store.muted(),
            TrackKind::Video => store.video_off(),
        };
        let flip = |store: &PreferenceStore| match kind {
            TrackKind::Audio => store.toggle_mute(),
            TrackKind::Video => store.toggle_video_off(),
        };

        let active = self.state.borrow().active_stream.clone();
        match self.options.toggle_order {
            ToggleOrder::TracksFirst => {
                // The pre-toggle flag is the post-toggle `enabled` value.
                if let Some(stream) = &active {
                    stream.set_enabled(kind, flag(&self.preferences));
                }
                flip(&self.preferences);
            }
            ToggleOrder::StoreFirst => {
                flip(&self.preferences);
                if let Some(stream) = &active {
                    stream.set_enabled(kind, !flag(&self.preferences));
                }
            }
        }
    }
}
