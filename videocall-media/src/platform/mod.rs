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

//! Implementations of the [`MediaDevicesProvider`](crate::MediaDevicesProvider) port.
//!
//! - **`fake`**: scripted in-memory devices, available on every target
//! - **`web`**: `navigator.mediaDevices`, compiled with the `wasm` feature

pub mod fake;
#[cfg(feature = "wasm")]
pub mod web;

pub use fake::{FakeMediaDevices, FakeTrack};
#[cfg(feature = "wasm")]
pub use web::{BrowserMediaDevices, BrowserTrack};
