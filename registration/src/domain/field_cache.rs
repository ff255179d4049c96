//! Field-level auto-save for banking details.
//!
//! Each banking field is persisted on its own under the shared
//! `bankingAutoSave` namespace. Writes are debounced per field; persistence
//! failures are logged and swallowed because the in-memory form remains the
//! source of truth for the running session.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::ports::KeyValueStore;
use crate::domain::{BankingField, DebounceTicket, Debouncer, StorageKey};

/// Default quiet period before a banking field is written.
pub const DEFAULT_FIELD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debounced per-field persistence of banking details.
pub struct FieldAutoSaveCache {
    store: Arc<dyn KeyValueStore>,
    debouncer: Debouncer<BankingField, String>,
}

impl FieldAutoSaveCache {
    /// Create a cache writing to `store` after `delay` of inactivity per field.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, delay: Duration) -> Self {
        Self {
            store,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Schedule `value` to be written for `field`.
    ///
    /// The returned ticket cancels this scheduling through
    /// [`FieldAutoSaveCache::cancel`] until a later edit replaces it.
    pub fn save_field(
        &mut self,
        field: BankingField,
        value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DebounceTicket {
        self.debouncer.schedule(field, value.into(), now)
    }

    /// Drop the write scheduled under `ticket`, if it is still pending.
    ///
    /// Returns `true` when a write was dropped.
    pub fn cancel(&mut self, ticket: DebounceTicket) -> bool {
        self.debouncer.cancel(ticket)
    }

    /// Whether a write for `field` is waiting on its debounce window.
    #[must_use]
    pub fn is_pending(&self, field: BankingField) -> bool {
        self.debouncer.is_pending(&field)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.debouncer.next_deadline()
    }

    /// Write every field whose window has elapsed. Returns the number of
    /// successful writes.
    pub fn flush_due(&mut self, now: DateTime<Utc>) -> usize {
        let due = self.debouncer.take_due(now);
        self.write_all(due)
    }

    /// Write every pending field immediately.
    pub fn flush_all(&mut self) -> usize {
        let pending = self.debouncer.drain();
        self.write_all(pending)
    }

    /// Drop every pending write.
    pub fn cancel_all(&mut self) {
        self.debouncer.cancel_all();
    }

    /// Read every stored banking field. Unreadable entries are skipped.
    #[must_use]
    pub fn load_all(&self) -> BTreeMap<BankingField, String> {
        BankingField::ALL
            .into_iter()
            .filter_map(|field| self.load(field).map(|value| (field, value)))
            .collect()
    }

    /// Cancel pending writes and remove every stored banking field.
    pub fn clear(&mut self) {
        self.debouncer.cancel_all();
        for field in BankingField::ALL {
            let key = StorageKey::BankingField(field);
            if let Err(error) = self.store.remove(&key) {
                warn!(%key, %error, "failed to clear auto-saved banking field");
            }
        }
    }

    fn load(&self, field: BankingField) -> Option<String> {
        let key = StorageKey::BankingField(field);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%key, %error, "failed to read auto-saved banking field");
                return None;
            }
        };
        match serde_json::from_str::<String>(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%key, %error, "discarding corrupt auto-saved banking field");
                None
            }
        }
    }

    fn write_all(&self, entries: Vec<(BankingField, String)>) -> usize {
        entries
            .into_iter()
            .filter(|(field, value)| self.write(*field, value))
            .count()
    }

    fn write(&self, field: BankingField, value: &str) -> bool {
        let key = StorageKey::BankingField(field);
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(%key, %error, "failed to encode banking field");
                return false;
            }
        };
        match self.store.set(&key, &encoded) {
            Ok(()) => {
                debug!(%key, "auto-saved banking field");
                true
            }
            Err(error) => {
                warn!(%key, %error, "failed to auto-save banking field");
                false
            }
        }
    }
}
