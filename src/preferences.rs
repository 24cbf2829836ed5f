//! User-facing toggles, persisted through the storage collaborator.

use serde::{Deserialize, Serialize};

use crate::note::SortOrder;
use crate::storage::{load_or_default, Storage, StorageError};

/// Storage key for [`Preferences`].
pub const PREFERENCES_KEY: &str = "preferences";

/// Which editing assists are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Show next-word suggestions.
    pub predictive: bool,
    /// Close brackets and quotes automatically.
    pub auto_closure: bool,
    /// Continue lists on Enter.
    pub auto_list: bool,
    /// Ask the editing surface to spellcheck.
    pub spellcheck: bool,
    /// Order of the note list.
    pub sorting: SortOrder,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            predictive: true,
            auto_closure: true,
            auto_list: true,
            spellcheck: false,
            sorting: SortOrder::Modified,
        }
    }
}

impl Preferences {
    /// Load stored preferences, falling back to the defaults on any failure.
    pub fn load<S: Storage>(storage: &S) -> Self {
        load_or_default(storage, PREFERENCES_KEY, Self::default())
    }

    pub fn save<S: Storage>(&self, storage: &S) -> Result<(), StorageError> {
        storage.save(PREFERENCES_KEY, self)
    }
}
