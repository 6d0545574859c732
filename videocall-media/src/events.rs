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

//! Framework-agnostic events published by a media session.
//!
//! Any frontend (Yew, Dioxus, Leptos, or plain JS through wasm-bindgen) can subscribe through
//! [`MediaSessionManager::subscribe_events`](crate::MediaSessionManager::subscribe_events).

use crate::provider::TrackKind;

#[derive(Clone, Debug, PartialEq)]
pub enum MediaEvent {
    // === Permission Events ===
    /// The permission probe acquired both camera and microphone
    PermissionGranted,

    /// The permission probe failed
    PermissionDenied(String),

    // === Device Events ===
    /// Devices have been enumerated; carries the number of entries
    DevicesLoaded(usize),

    /// The set of attached devices changed since the last enumeration
    DevicesChanged,

    // === Stream Events ===
    /// A new active stream was acquired
    StreamAcquired { stream_id: String },

    /// An input was switched to another device
    InputSwitched { kind: TrackKind, device_id: String },

    /// The preferred speaker changed
    AudioOutputChanged(String),

    /// Mute state after a toggle
    MuteChanged(bool),

    /// Video-off state after a toggle
    VideoOffChanged(bool),
}
