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

//! The platform media port.
//!
//! [`MediaDevicesProvider`] is the seam between the session logic and whatever actually owns the
//! hardware: `navigator.mediaDevices` in the browser, or [`FakeMediaDevices`](crate::FakeMediaDevices)
//! in tests and headless hosts. Everything above this module only talks to these traits.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constraints::MediaConstraints;
use crate::error::Result;
use crate::media_devices::DeviceDescriptor;

/// The kind of signal carried by a [`MediaTrack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

/// A handle to one audio or video channel of a stream.
///
/// Handles are cheap clones that all refer to the same underlying platform track, so
/// `set_enabled` or `stop` on any clone is visible through every other clone.
pub trait MediaTrack: Clone + fmt::Debug + 'static {
    fn id(&self) -> String;

    fn kind(&self) -> TrackKind;

    fn label(&self) -> String;

    fn enabled(&self) -> bool;

    /// Disabling a track keeps the capture running but silences (audio) or blanks (video) its
    /// output.
    fn set_enabled(&self, enabled: bool);

    /// Releases the hardware. A stopped track can not be restarted.
    fn stop(&self);

    fn is_live(&self) -> bool;
}

/// A bundle of tracks produced by a single acquisition.
#[derive(Clone, Debug)]
pub struct MediaStream<T> {
    id: String,
    tracks: Vec<T>,
}

impl<T: MediaTrack> MediaStream<T> {
    pub fn new(id: impl Into<String>, tracks: Vec<T>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[T] {
        &self.tracks
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &T> {
        self.tracks_of(TrackKind::Audio)
    }

    pub fn video_tracks(&self) -> impl Iterator<Item = &T> {
        self.tracks_of(TrackKind::Video)
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &T> {
        self.tracks.iter().filter(move |track| track.kind() == kind)
    }

    /// Returns a handle to the first track of the given kind, if any.
    pub fn first_track(&self, kind: TrackKind) -> Option<T> {
        self.tracks_of(kind).next().cloned()
    }

    /// Sets `enabled` on every track of the given kind.
    pub fn set_enabled(&self, kind: TrackKind, enabled: bool) {
        for track in self.tracks_of(kind) {
            track.set_enabled(enabled);
        }
    }

    /// Stops every track of the stream.
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    /// True while at least one track is still capturing.
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }
}

/// Access to the platform's device enumeration and acquisition calls.
///
/// Futures returned by the provider are not required to be `Send`; the session runs on a
/// single-threaded event loop (the browser's, or a current-thread runtime natively).
#[async_trait(?Send)]
pub trait MediaDevicesProvider {
    type Track: MediaTrack;

    /// Lists every attached input and output device.
    async fn enumerate_devices(&self) -> Result<Vec<DeviceDescriptor>>;

    /// Acquires a new stream satisfying `constraints`.
    ///
    /// Fails with [`MediaError::PermissionDenied`](crate::MediaError::PermissionDenied) when the
    /// user or the OS refuses access, and with
    /// [`MediaError::AcquisitionFailed`](crate::MediaError::AcquisitionFailed) when the device is
    /// busy or the constraints can not be satisfied.
    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<MediaStream<Self::Track>>;
}
