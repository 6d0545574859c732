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

use crate::provider::TrackKind;

/// How a single media kind should be requested from the platform.
///
/// Serializes untagged, so `true` and `"cam-1"` are both valid encodings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackConstraint {
    /// Generic request: `true` lets the platform pick a device, `false` skips the kind.
    Any(bool),
    /// Only this device will do. The acquisition fails rather than falling back.
    Exact(String),
}

impl TrackConstraint {
    /// Whether a track of this kind is requested at all.
    pub fn is_requested(&self) -> bool {
        match self {
            TrackConstraint::Any(requested) => *requested,
            TrackConstraint::Exact(_) => true,
        }
    }

    pub fn device_id(&self) -> Option<&str> {
        match self {
            TrackConstraint::Exact(id) => Some(id),
            TrackConstraint::Any(_) => None,
        }
    }

    /// `Exact(id)` for a known device, `Any(true)` otherwise.
    pub fn device_or_any(device_id: Option<&str>) -> Self {
        match device_id {
            Some(id) if !id.is_empty() => TrackConstraint::Exact(id.to_string()),
            _ => TrackConstraint::Any(true),
        }
    }
}

impl Default for TrackConstraint {
    fn default() -> Self {
        TrackConstraint::Any(true)
    }
}

impl From<bool> for TrackConstraint {
    fn from(requested: bool) -> Self {
        TrackConstraint::Any(requested)
    }
}

// An empty id carries no device and is treated like `false`.
impl From<String> for TrackConstraint {
    fn from(device_id: String) -> Self {
        if device_id.is_empty() {
            TrackConstraint::Any(false)
        } else {
            TrackConstraint::Exact(device_id)
        }
    }
}

impl From<&str> for TrackConstraint {
    fn from(device_id: &str) -> Self {
        TrackConstraint::from(device_id.to_string())
    }
}

/// Per-kind constraints for one acquisition call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    pub audio: TrackConstraint,
    pub video: TrackConstraint,
}

impl MediaConstraints {
    pub fn new(audio: impl Into<TrackConstraint>, video: impl Into<TrackConstraint>) -> Self {
        Self {
            audio: audio.into(),
            video: video.into(),
        }
    }

    /// Any microphone and any camera. Used for permission probes.
    pub fn any() -> Self {
        Self::new(true, true)
    }

    pub fn get(&self, kind: TrackKind) -> &TrackConstraint {
        match kind {
            TrackKind::Audio => &self.audio,
            TrackKind::Video => &self.video,
        }
    }
}
