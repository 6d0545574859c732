//! This crate manages the local media of a videocall.rs participant: which camera, microphone
//! and speaker are used, acquiring their streams, switching devices mid-call and muting.  It
//! knows nothing about signaling or transport; encoders and peer connections consume the tracks
//! it hands out.
//!
//! Two pieces do the work:
//!
//! * [PreferenceStore] remembers the selected devices and the mute / video-off flags across
//!   sessions through a pluggable [PreferenceStorage] backend.
//! * [MediaSessionManager] talks to the platform through a [MediaDevicesProvider]: in the browser
//!   [`BrowserMediaDevices`](platform::web::BrowserMediaDevices) (feature `wasm`), elsewhere
//!   [FakeMediaDevices] or your own implementation.
//!
//! # Outline of usage
//!
//! ## Preferences:
//! ```ignore
//! let preferences = Rc::new(PreferenceStore::new(JsonFileStorage::default_location()?));
//! preferences.subscribe(|state| log::info!("preferences changed: {state:?}"));
//! ```
//!
//! ## Session bring-up:
//! ```ignore
//! let session = MediaSessionManager::new(provider, Rc::clone(&preferences), MediaSessionOptions {
//!     prefer_environment_camera: true,
//!     ..Default::default()
//! });
//! session.start().await?;
//! ```
//!
//! ## During the call:
//! ```ignore
//! let microphones = session.audio_devices();
//! session.switch_input(&microphones[1].device_id, TrackKind::Audio).await?;
//! session.switch_audio_output(&session.output_devices()[0].device_id);
//! session.toggle_mute();
//! session.toggle_video();
//! ```
//!
//! ## Teardown:
//! ```ignore
//! session.stop_streaming(session.active_stream().as_ref());
//! session.stop_all_streaming();
//! ```

mod constants;
mod constraints;
mod error;
mod event_bus;
mod events;
mod media_devices;
mod preferences;
mod provider;
mod session;

pub mod platform;

pub use constants::STORAGE_KEY;
pub use constraints::{MediaConstraints, TrackConstraint};
pub use error::{MediaError, Result};
pub use event_bus::EventBus;
pub use events::MediaEvent;
pub use media_devices::{
    resolve_default_devices, DeviceDescriptor, DeviceKind, DeviceList, PermissionResult,
    ResolvedDevices,
};
pub use platform::{FakeMediaDevices, FakeTrack};
#[cfg(not(target_arch = "wasm32"))]
pub use preferences::JsonFileStorage;
#[cfg(feature = "wasm")]
pub use preferences::LocalStorage;
pub use preferences::{
    DeviceType, MemoryStorage, PreferenceState, PreferenceStorage, PreferenceStore,
    SubscriptionId,
};
pub use provider::{MediaDevicesProvider, MediaStream, MediaTrack, TrackKind};
pub use session::{
    MediaSessionManager, MediaSessionOptions, MediaSessionSnapshot, SessionPhase,
    SwitchInputResult, ToggleOrder,
};
