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

use thiserror::Error;

use crate::provider::TrackKind;

/// Result type for media session operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors that can occur while acquiring or managing local media
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Media acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("Device enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("Acquired stream has no {0} track")]
    MissingTrack(TrackKind),

    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    #[error("Preference storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for MediaError {
    fn from(e: serde_json::Error) -> Self {
        MediaError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        MediaError::Storage(e.to_string())
    }
}
