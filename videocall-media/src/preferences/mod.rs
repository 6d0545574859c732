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

//! The user's device selection and mute / video-off flags.
//!
//! [`PreferenceStore`] is an explicitly owned object: create one, wrap it in an `Rc` and hand it
//! to every [`MediaSessionManager`](crate::MediaSessionManager) and UI component that needs it.
//! Persistence is delegated to a [`PreferenceStorage`] backend (read once at construction,
//! written after every mutation), and consumers observe changes through
//! [`subscribe`](PreferenceStore::subscribe).
//!
//! ```ignore
//! let store = Rc::new(PreferenceStore::new(JsonFileStorage::default_location()?));
//! let id = store.subscribe(|state| log::info!("muted = {}", state.muted));
//! store.toggle_mute();
//! store.unsubscribe(id);
//! ```

mod storage;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::JsonFileStorage;
#[cfg(feature = "wasm")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, PreferenceStorage};

/// The preference slot a device id is stored under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceType {
    Audio,
    Video,
    AudioOutput,
}

/// Snapshot of the stored preferences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceState {
    pub audio: Option<String>,
    pub video: Option<String>,
    pub audio_output: Option<String>,
    pub muted: bool,
    pub video_off: bool,
}

impl PreferenceState {
    pub fn selected(&self, kind: DeviceType) -> Option<&str> {
        match kind {
            DeviceType::Audio => self.audio.as_deref(),
            DeviceType::Video => self.video.as_deref(),
            DeviceType::AudioOutput => self.audio_output.as_deref(),
        }
    }
}

/// Handle returned by [`PreferenceStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&PreferenceState)>;

/// Owned, observable, persisted preference state.
///
/// All mutators are synchronous and never fail; a storage error is logged and the in-memory
/// state still changes.
pub struct PreferenceStore {
    state: RefCell<PreferenceState>,
    storage: Box<dyn PreferenceStorage>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
}

impl PreferenceStore {
    /// Creates a store and loads its initial state from `storage`.
    ///
    /// A missing or unreadable entry starts the store from [`PreferenceState::default`].
    pub fn new(storage: impl PreferenceStorage + 'static) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => PreferenceState::default(),
            Err(e) => {
                warn!("Failed to load stored preferences, starting from defaults: {e}");
                PreferenceState::default()
            }
        };
        Self {
            state: RefCell::new(state),
            storage: Box::new(storage),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    /// A store backed by [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    pub fn get_state(&self) -> PreferenceState {
        self.state.borrow().clone()
    }

    /// Replaces the stored id for `kind`. The id is not checked against the device list.
    pub fn set(&self, device_id: impl Into<String>, kind: DeviceType) {
        let device_id = device_id.into();
        self.update(|state| match kind {
            DeviceType::Audio => state.audio = Some(device_id),
            DeviceType::Video => state.video = Some(device_id),
            DeviceType::AudioOutput => state.audio_output = Some(device_id),
        });
    }

    pub fn toggle_mute(&self) {
        self.update(|state| state.muted = !state.muted);
    }

    pub fn toggle_video_off(&self) {
        self.update(|state| state.video_off = !state.video_off);
    }

    pub fn audio(&self) -> Option<String> {
        self.state.borrow().audio.clone()
    }

    pub fn video(&self) -> Option<String> {
        self.state.borrow().video.clone()
    }

    pub fn audio_output(&self) -> Option<String> {
        self.state.borrow().audio_output.clone()
    }

    pub fn selected(&self, kind: DeviceType) -> Option<String> {
        self.state.borrow().selected(kind).map(str::to_string)
    }

    pub fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    pub fn video_off(&self) -> bool {
        self.state.borrow().video_off
    }

    /// Registers a listener that is called with the new state after every mutation.
    pub fn subscribe(&self, listener: impl Fn(&PreferenceState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn update(&self, mutate: impl FnOnce(&mut PreferenceState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            mutate(&mut state);
            state.clone()
        };

        if let Err(e) = self.storage.save(&snapshot) {
            warn!("Failed to persist preferences: {e}");
        }

        // Listeners may call back into the store, so none of our borrows can be held here.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("state", &*self.state.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MediaError, Result};

    struct FailingStorage;

    impl PreferenceStorage for FailingStorage {
        fn load(&self) -> Result<Option<PreferenceState>> {
            Err(MediaError::Storage("disk on fire".to_string()))
        }

        fn save(&self, _state: &PreferenceState) -> Result<()> {
            Err(MediaError::Storage("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_new_store_starts_empty() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.get_state(), PreferenceState::default());
        assert!(!store.muted());
        assert!(!store.video_off());
    }

    #[test]
    fn test_set_replaces_only_its_slot() {
        let store = PreferenceStore::in_memory();
        store.set("mic-1", DeviceType::Audio);
        store.set("cam-1", DeviceType::Video);
        store.set("cam-2", DeviceType::Video);
        assert_eq!(store.audio().as_deref(), Some("mic-1"));
        assert_eq!(store.video().as_deref(), Some("cam-2"));
        assert_eq!(store.audio_output(), None);
    }

    #[test]
    fn test_toggles_flip_flags() {
        let store = PreferenceStore::in_memory();
        store.toggle_mute();
        assert!(store.muted());
        store.toggle_mute();
        assert!(!store.muted());
        store.toggle_video_off();
        assert!(store.video_off());
    }

    #[test]
    fn test_mutations_write_through() {
        let storage = MemoryStorage::new();
        let store = PreferenceStore::new(storage.clone());
        store.set("spk-1", DeviceType::AudioOutput);
        assert_eq!(
            storage.stored().and_then(|s| s.audio_output).as_deref(),
            Some("spk-1")
        );
    }

    #[test]
    fn test_failing_storage_never_breaks_mutators() {
        let store = PreferenceStore::new(FailingStorage);
        store.set("cam-1", DeviceType::Video);
        store.toggle_mute();
        assert_eq!(store.video().as_deref(), Some("cam-1"));
        assert!(store.muted());
    }

    #[test]
    fn test_listener_may_read_store_reentrantly() {
        let store = Rc::new(PreferenceStore::in_memory());
        let seen = Rc::new(Cell::new(false));
        let store_clone = Rc::clone(&store);
        let seen_clone = Rc::clone(&seen);
        store.subscribe(move |state| {
            seen_clone.set(store_clone.muted() == state.muted);
        });
        store.toggle_mute();
        assert!(seen.get());
    }

    #[test]
    fn test_state_json_uses_camel_case() {
        let state = PreferenceState {
            audio_output: Some("spk".to_string()),
            video_off: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["audioOutput"], "spk");
        assert_eq!(json["videoOff"], true);

        let partial: PreferenceState = serde_json::from_str(r#"{"muted": true}"#).unwrap();
        assert!(partial.muted);
        assert_eq!(partial.video, None);
    }
}
