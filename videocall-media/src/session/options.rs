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

/// Order of the two steps of a mute / video-off toggle.
///
/// Both orders leave the tracks in the same final state (`enabled == !flag`); they differ in
/// what a [`PreferenceStore`](crate::PreferenceStore) listener sees when it is notified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleOrder {
    /// Tracks take the pre-toggle flag first, then the store flips. Listeners observe tracks
    /// that already match the new state.
    #[default]
    TracksFirst,
    /// The store flips first and tracks follow the post-toggle flag. Listeners run while the
    /// tracks still reflect the old state.
    StoreFirst,
}

/// Parameters for [`MediaSessionManager`](crate::MediaSessionManager).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaSessionOptions {
    /// Start on a camera labeled "environment" (a phone's rear camera) when one exists, even if
    /// another camera is stored in the preferences.
    pub prefer_environment_camera: bool,

    pub toggle_order: ToggleOrder,
}
