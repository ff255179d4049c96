//! Whole-form draft snapshots, one per registration role.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::ports::KeyValueStore;
use crate::domain::{DebounceTicket, Debouncer, RegistrationRole, RoleFormData, StorageKey};

/// Default quiet period before a draft snapshot is written.
pub const DEFAULT_DRAFT_DEBOUNCE: Duration = Duration::from_millis(1_000);

/// Debounced persistence of whole-form snapshots.
///
/// ## Consistency
/// The draft cache and [`crate::domain::FieldAutoSaveCache`] use different
/// windows, so they may briefly disagree about a banking field. Once both
/// windows have elapsed they hold the same values.
pub struct DraftSnapshotCache {
    store: Arc<dyn KeyValueStore>,
    debouncer: Debouncer<RegistrationRole, RoleFormData>,
}

impl DraftSnapshotCache {
    /// Create a cache writing to `store` after `delay` of inactivity per role.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, delay: Duration) -> Self {
        Self {
            store,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Schedule `snapshot` to be written under its role's draft key.
    pub fn save_draft(&mut self, snapshot: RoleFormData, now: DateTime<Utc>) -> DebounceTicket {
        self.debouncer.schedule(snapshot.role(), snapshot, now)
    }

    /// Drop the snapshot scheduled under `ticket` if no later save replaced
    /// it. Returns `true` when a snapshot was dropped.
    pub fn cancel(&mut self, ticket: DebounceTicket) -> bool {
        self.debouncer.cancel(ticket)
    }

    /// Whether a snapshot for `role` is waiting on its debounce window.
    #[must_use]
    pub fn is_pending(&self, role: RegistrationRole) -> bool {
        self.debouncer.is_pending(&role)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.debouncer.next_deadline()
    }

    /// Write every snapshot whose window has elapsed. Returns the number of
    /// successful writes.
    pub fn flush_due(&mut self, now: DateTime<Utc>) -> usize {
        let due = self.debouncer.take_due(now);
        due.into_iter()
            .filter(|(_, snapshot)| self.write(snapshot))
            .count()
    }

    /// Write every pending snapshot immediately.
    pub fn flush_all(&mut self) -> usize {
        let pending = self.debouncer.drain();
        pending
            .into_iter()
            .filter(|(_, snapshot)| self.write(snapshot))
            .count()
    }

    /// Read the stored draft for `role`.
    ///
    /// Missing, unreadable and corrupt drafts all read as `None`; the latter
    /// two are logged.
    #[must_use]
    pub fn load_draft(&self, role: RegistrationRole) -> Option<RoleFormData> {
        let key = StorageKey::Draft(role);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%key, %error, "failed to read registration draft");
                return None;
            }
        };
        match RoleFormData::from_json(role, &raw) {
            Ok(form) => Some(form),
            Err(error) => {
                warn!(%key, %error, "discarding corrupt registration draft");
                None
            }
        }
    }

    /// Cancel any pending snapshot for `role` and delete its stored draft.
    pub fn clear_draft(&mut self, role: RegistrationRole) {
        self.debouncer.cancel_key(&role);
        let key = StorageKey::Draft(role);
        match self.store.remove(&key) {
            Ok(()) => debug!(%key, "cleared registration draft"),
            Err(error) => warn!(%key, %error, "failed to clear registration draft"),
        }
    }

    fn write(&self, snapshot: &RoleFormData) -> bool {
        let key = StorageKey::Draft(snapshot.role());
        let encoded = match snapshot.to_json() {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(%key, %error, "failed to encode registration draft");
                return false;
            }
        };
        match self.store.set(&key, &encoded) {
            Ok(()) => {
                debug!(%key, "saved registration draft");
                true
            }
            Err(error) => {
                warn!(%key, %error, "failed to save registration draft");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FormField;
    use crate::domain::ports::{MockKeyValueStore, StorageError};
    use crate::test_support::RecordingStore;
    use chrono::{TimeDelta, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn vendor_named(name: &str) -> RoleFormData {
        let mut form = RoleFormData::empty(RegistrationRole::Vendor);
        form.set_field(FormField::BusinessName, name);
        form
    }

    #[rstest]
    fn load_returns_latest_flushed_snapshot(start: DateTime<Utc>) {
        let store = Arc::new(RecordingStore::new());
        let mut cache = DraftSnapshotCache::new(store.clone(), DEFAULT_DRAFT_DEBOUNCE);

        cache.save_draft(vendor_named("Spaza"), start);
        cache.save_draft(vendor_named("Spaza Connect"), start + TimeDelta::milliseconds(400));
        assert_eq!(cache.flush_due(start + TimeDelta::milliseconds(1_399)), 0);
        assert!(cache.load_draft(RegistrationRole::Vendor).is_none());

        assert_eq!(cache.flush_due(start + TimeDelta::milliseconds(1_400)), 1);
        assert_eq!(
            cache.load_draft(RegistrationRole::Vendor),
            Some(vendor_named("Spaza Connect"))
        );
        assert_eq!(store.write_count(&StorageKey::Draft(RegistrationRole::Vendor)), 1);
    }

    #[rstest]
    fn roles_use_distinct_keys(start: DateTime<Utc>) {
        let store = Arc::new(RecordingStore::new());
        let mut cache = DraftSnapshotCache::new(store, DEFAULT_DRAFT_DEBOUNCE);
        let mut customer = RoleFormData::empty(RegistrationRole::Customer);
        customer.set_field(FormField::FirstName, "Lerato");

        cache.save_draft(customer.clone(), start);
        cache.save_draft(vendor_named("Spaza"), start);
        assert_eq!(cache.flush_all(), 2);

        assert_eq!(cache.load_draft(RegistrationRole::Customer), Some(customer));
        assert_eq!(cache.load_draft(RegistrationRole::Vendor), Some(vendor_named("Spaza")));
        assert!(cache.load_draft(RegistrationRole::Admin).is_none());
    }

    #[rstest]
    fn clear_draft_cancels_pending_write(start: DateTime<Utc>) {
        let store = Arc::new(RecordingStore::new());
        let mut cache = DraftSnapshotCache::new(store, DEFAULT_DRAFT_DEBOUNCE);
        cache.save_draft(vendor_named("Spaza"), start);
        cache.flush_all();
        cache.save_draft(vendor_named("Spaza Connect"), start);

        cache.clear_draft(RegistrationRole::Vendor);

        assert!(!cache.is_pending(RegistrationRole::Vendor));
        assert_eq!(cache.flush_due(start + TimeDelta::seconds(10)), 0);
        assert!(cache.load_draft(RegistrationRole::Vendor).is_none());
    }

    #[rstest]
    fn corrupt_and_unreadable_drafts_read_as_absent() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .withf(|key| *key == StorageKey::Draft(RegistrationRole::Admin))
            .returning(|_| Ok(Some("{not json".to_owned())));
        store
            .expect_get()
            .withf(|key| *key == StorageKey::Draft(RegistrationRole::Customer))
            .returning(|_| Err(StorageError::unavailable("disk detached")));
        let cache = DraftSnapshotCache::new(Arc::new(store), DEFAULT_DRAFT_DEBOUNCE);

        assert!(cache.load_draft(RegistrationRole::Admin).is_none());
        assert!(cache.load_draft(RegistrationRole::Customer).is_none());
    }

    #[rstest]
    fn cancelled_ticket_leaves_stored_draft_alone(start: DateTime<Utc>) {
        let store = Arc::new(RecordingStore::new());
        let mut cache = DraftSnapshotCache::new(store.clone(), DEFAULT_DRAFT_DEBOUNCE);
        cache.save_draft(vendor_named("Spaza"), start);
        cache.flush_all();

        let ticket = cache.save_draft(vendor_named("Spaza Connect"), start);
        assert!(cache.cancel(ticket));

        assert_eq!(cache.flush_due(start + TimeDelta::seconds(5)), 0);
        assert_eq!(cache.load_draft(RegistrationRole::Vendor), Some(vendor_named("Spaza")));
        assert_eq!(store.write_count(&StorageKey::Draft(RegistrationRole::Vendor)), 1);
    }
}
