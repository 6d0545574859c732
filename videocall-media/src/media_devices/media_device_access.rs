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

use crate::constraints::MediaConstraints;
use crate::error::Result;
use crate::provider::MediaDevicesProvider;

/// Outcome of a permission probe, per media kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    pub video: bool,
    pub audio: bool,
}

impl PermissionResult {
    pub fn granted() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }

    /// True only if both kinds were granted.
    pub fn is_granted(&self) -> bool {
        self.video && self.audio
    }
}

/// Acquires any camera and any microphone and releases them right away.
///
/// On the web this is what makes the browser show its permission prompt; once it succeeds the
/// enumeration call starts reporting device labels and ids.
pub(crate) async fn request_access<P: MediaDevicesProvider>(provider: &P) -> Result<()> {
    let stream = provider.get_user_media(&MediaConstraints::any()).await?;
    log::debug!(
        "permission probe acquired stream {} with {} tracks",
        stream.id(),
        stream.tracks().len()
    );
    stream.stop();
    Ok(())
}
