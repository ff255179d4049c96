//! Process-local key-value store.
//!
//! `MemoryStore` behaves like a browser's local storage: values survive for
//! the life of the process, and an optional byte quota makes writes fail once
//! the store is full. Only the current entries are kept.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::StorageKey;
use crate::domain::ports::{KeyValueStore, StorageError};

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, String>,
}

impl State {
    fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }
}

/// In-memory [`KeyValueStore`] with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// An unbounded, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that rejects writes once keys plus values would exceed
    /// `bytes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use registration::domain::ports::KeyValueStore;
    /// use registration::domain::{RegistrationRole, StorageKey};
    /// use registration::outbound::MemoryStore;
    ///
    /// let store = MemoryStore::with_quota(16);
    /// let key = StorageKey::Authenticated(RegistrationRole::Vendor);
    /// assert!(store.set(&key, "true").is_err());
    /// ```
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            state: Mutex::default(),
            quota: Some(bytes),
        }
    }

    /// Bytes held by keys plus values, as counted against the quota.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the store lock is poisoned.
    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.used_bytes())
    }

    /// Copy of every stored entry, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the store lock is poisoned.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(self.lock()?.entries.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::unavailable("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.entries.get(&key.render()).cloned())
    }

    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        let rendered = key.render();
        let bytes = rendered.len() + value.len();
        let mut state = self.lock()?;
        if let Some(quota) = self.quota {
            let replaced = state
                .entries
                .get(&rendered)
                .map_or(0, |previous| rendered.len() + previous.len());
            if state.used_bytes() - replaced + bytes > quota {
                return Err(StorageError::quota_exceeded(rendered, bytes));
            }
        }
        state.entries.insert(rendered, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.lock()?.entries.remove(&key.render());
        Ok(())
    }
}
