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

use crate::media_devices::{DeviceDescriptor, DeviceList};
use crate::provider::MediaStream;

/// Lifecycle of a session. Phases only move forward; device switches stay in
/// [`StreamAcquired`](SessionPhase::StreamAcquired).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    Uninitialized,
    PermissionChecked,
    DevicesEnumerated,
    StreamAcquired,
}

//
// SessionState holds everything the session manager mutates. It lives in a RefCell, and no
// borrow of it may be held across an await point.
//
pub(crate) struct SessionState<T> {
    pub(crate) stream: Option<MediaStream<T>>,
    pub(crate) active_stream: Option<MediaStream<T>>,
    pub(crate) devices: DeviceList,
    pub(crate) ready: bool,
    pub(crate) access_granted: bool,
    pub(crate) phase: SessionPhase,
}

impl<T> SessionState<T> {
    pub(crate) fn new() -> Self {
        Self {
            stream: None,
            active_stream: None,
            devices: DeviceList::default(),
            ready: false,
            access_granted: false,
            phase: SessionPhase::Uninitialized,
        }
    }

    pub(crate) fn advance(&mut self, phase: SessionPhase) {
        if phase > self.phase {
            self.phase = phase;
        }
    }
}

/// Plain-data view of a session, for rendering.
#[derive(Clone, Debug)]
pub struct MediaSessionSnapshot<T> {
    pub stream: Option<MediaStream<T>>,
    pub active_stream: Option<MediaStream<T>>,
    pub audio_devices: Vec<DeviceDescriptor>,
    pub video_devices: Vec<DeviceDescriptor>,
    pub output_devices: Vec<DeviceDescriptor>,
    pub selected_audio_device: Option<String>,
    pub selected_video_device: Option<String>,
    pub selected_output_device: Option<String>,
    pub ready: bool,
    pub access_granted: bool,
    pub muted: bool,
    pub video_off: bool,
    pub phase: SessionPhase,
}

/// What a successful [`switch_input`](crate::MediaSessionManager::switch_input) replaced.
///
/// Hand the new tracks to any peer connection (`replaceTrack`) or preview element that still
/// holds the old ones; the old tracks are already stopped.
#[derive(Clone, Debug)]
pub struct SwitchInputResult<T> {
    pub old_video_track: T,
    pub new_video_track: T,
    pub old_audio_track: T,
    pub new_audio_track: T,
    pub new_stream: MediaStream<T>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FakeTrack;

    #[test]
    fn test_phase_never_moves_backwards() {
        let mut state = SessionState::<FakeTrack>::new();
        state.advance(SessionPhase::DevicesEnumerated);
        state.advance(SessionPhase::PermissionChecked);
        assert_eq!(state.phase, SessionPhase::DevicesEnumerated);
        state.advance(SessionPhase::StreamAcquired);
        assert_eq!(state.phase, SessionPhase::StreamAcquired);
    }
}
