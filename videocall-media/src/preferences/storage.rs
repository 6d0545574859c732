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

//! Persistence backends for [`PreferenceStore`](super::PreferenceStore).

use std::cell::RefCell;
use std::rc::Rc;

use super::PreferenceState;
use crate::error::Result;

/// Key-value persistence for the preference state.
///
/// The store calls [`load`](Self::load) once when it is constructed and [`save`](Self::save)
/// after every mutation.
pub trait PreferenceStorage {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<PreferenceState>>;

    fn save(&self, state: &PreferenceState) -> Result<()>;
}

/// Volatile storage. Clones share the same slot, so a test can keep a handle and inspect what
/// the store wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<PreferenceState>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PreferenceState) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(state))),
        }
    }

    /// What was last saved, if anything.
    pub fn stored(&self) -> Option<PreferenceState> {
        self.slot.borrow().clone()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PreferenceState>> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, state: &PreferenceState) -> Result<()> {
        *self.slot.borrow_mut() = Some(state.clone());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::path::{Path, PathBuf};

    use directories_next::ProjectDirs;

    use super::PreferenceStorage;
    use crate::constants::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, STORAGE_KEY};
    use crate::error::{MediaError, Result};
    use crate::preferences::PreferenceState;

    /// Stores the preferences as a JSON document on disk.
    #[derive(Clone, Debug)]
    pub struct JsonFileStorage {
        path: PathBuf,
    }

    impl JsonFileStorage {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// `<config dir>/videocall-media-preferences.json` in the user's platform config
        /// directory.
        pub fn default_location() -> Result<Self> {
            let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).ok_or_else(
                || MediaError::Storage("could not determine a config directory".to_string()),
            )?;
            Ok(Self::new(
                dirs.config_dir().join(format!("{STORAGE_KEY}.json")),
            ))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl PreferenceStorage for JsonFileStorage {
        fn load(&self) -> Result<Option<PreferenceState>> {
            if !self.path.exists() {
                return Ok(None);
            }
            let contents = fs::read_to_string(&self.path)?;
            Ok(Some(serde_json::from_str(&contents)?))
        }

        fn save(&self, state: &PreferenceState) -> Result<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            // Write then rename so a crash never leaves a truncated document behind.
            let tmp = self.path.with_extension("json.tmp");
            fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
            fs::rename(&tmp, &self.path)?;
            Ok(())
        }
    }
}

#[cfg(feature = "wasm")]
pub use web::LocalStorage;

#[cfg(feature = "wasm")]
mod web {
    use super::PreferenceStorage;
    use crate::constants::STORAGE_KEY;
    use crate::error::{MediaError, Result};
    use crate::preferences::PreferenceState;

    /// Stores the preferences in `window.localStorage` under [`STORAGE_KEY`].
    #[derive(Clone, Debug, Default)]
    pub struct LocalStorage;

    impl LocalStorage {
        pub fn new() -> Self {
            Self
        }

        fn storage() -> Result<web_sys::Storage> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| MediaError::Unsupported("localStorage is not available".to_string()))
        }
    }

    impl PreferenceStorage for LocalStorage {
        fn load(&self) -> Result<Option<PreferenceState>> {
            let raw = Self::storage()?
                .get_item(STORAGE_KEY)
                .map_err(|e| MediaError::Storage(format!("{e:?}")))?;
            match raw {
                Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
                None => Ok(None),
            }
        }

        fn save(&self, state: &PreferenceState) -> Result<()> {
            let raw = serde_json::to_string(state)?;
            Self::storage()?
                .set_item(STORAGE_KEY, &raw)
                .map_err(|e| MediaError::Storage(format!("{e:?}")))
        }
    }
}
