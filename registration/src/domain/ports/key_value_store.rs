//! Port for the durable client-side key-value store.
//!
//! The [`KeyValueStore`] trait mirrors a browser-style local store: string
//! keys, JSON text values, synchronous calls. Adapters provide the actual
//! persistence; the domain only ever talks to this trait so tests can swap in
//! in-memory fakes.

use crate::domain::StorageKey;

use super::define_port_error;

define_port_error! {
    /// Errors raised by key-value store adapters.
    pub enum StorageError {
        /// The backing store could not be reached or opened.
        Unavailable { message: String } =>
            "key-value store unavailable: {message}",
        /// The write would exceed the store's capacity.
        QuotaExceeded { key: String, bytes: usize } =>
            "storage quota exceeded writing {bytes} bytes to '{key}'",
        /// A value could not be encoded or decoded.
        Serialization { key: String, message: String } =>
            "failed to (de)serialise '{key}': {message}",
    }
}

/// Port for string-keyed durable storage.
///
/// Every method takes `&self`; adapters use interior mutability so one store
/// can be shared by the field cache, the draft cache and the resolver.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, `None` when absent.
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&self, key: &StorageKey) -> Result<(), StorageError>;
}
