//! Deadline-based debouncing keyed by an arbitrary identifier.
//!
//! A [`Debouncer`] holds at most one pending value per key. Scheduling a key
//! that is already pending replaces its value and restarts its deadline, so a
//! burst of edits to one field produces a single write carrying the last
//! value. Time is supplied by the caller, which lets tests drive the debouncer
//! from a virtual clock instead of real timers.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Handle identifying one scheduling of a key.
///
/// Cancelling with a ticket only affects the scheduling that produced it; once
/// the key has been rescheduled or flushed the ticket is stale and cancelling
/// is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceTicket(u64);

#[derive(Debug, Clone)]
struct Pending<V> {
    value: V,
    deadline: DateTime<Utc>,
    generation: u64,
}

/// Coalesces repeated values per key until a quiet period has elapsed.
#[derive(Debug, Clone)]
pub struct Debouncer<K, V> {
    delay: Duration,
    window: TimeDelta,
    pending: HashMap<K, Pending<V>>,
    next_generation: u64,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a debouncer that waits `delay` after the last schedule of a key.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            window: TimeDelta::from_std(delay).unwrap_or(TimeDelta::MAX),
            pending: HashMap::new(),
            next_generation: 0,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value` for `key`, replacing any pending value and restarting
    /// the key's deadline from `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use chrono::{TimeDelta, Utc};
    /// use registration::domain::Debouncer;
    ///
    /// let start = Utc::now();
    /// let mut debouncer = Debouncer::new(Duration::from_millis(500));
    /// debouncer.schedule("bankName", "FNB", start);
    /// debouncer.schedule("bankName", "ABSA", start + TimeDelta::milliseconds(100));
    ///
    /// assert!(debouncer.take_due(start + TimeDelta::milliseconds(599)).is_empty());
    /// assert_eq!(
    ///     debouncer.take_due(start + TimeDelta::milliseconds(600)),
    ///     vec![("bankName", "ABSA")]
    /// );
    /// ```
    pub fn schedule(&mut self, key: K, value: V, now: DateTime<Utc>) -> DebounceTicket {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        let deadline = now.checked_add_signed(self.window).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.pending.insert(
            key,
            Pending {
                value,
                deadline,
                generation,
            },
        );
        DebounceTicket(generation)
    }

    /// Cancel the scheduling identified by `ticket`.
    ///
    /// Returns `true` when a pending value was dropped.
    pub fn cancel(&mut self, ticket: DebounceTicket) -> bool {
        let key = self
            .pending
            .iter()
            .find(|(_, pending)| pending.generation == ticket.0)
            .map(|(key, _)| key.clone());
        key.is_some_and(|key| self.pending.remove(&key).is_some())
    }

    /// Cancel whatever is pending for `key`, returning the dropped value.
    pub fn cancel_key(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|pending| pending.value)
    }

    /// Drop every pending value.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Whether `key` has a pending value.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of keys with pending values.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.values().map(|pending| pending.deadline).min()
    }

    /// Remove and return every value whose deadline is at or before `now`,
    /// oldest deadline first.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        self.remove_ordered(due)
    }

    /// Remove and return every pending value regardless of deadline.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        let keys: Vec<K> = self.pending.keys().cloned().collect();
        self.remove_ordered(keys)
    }

    fn remove_ordered(&mut self, keys: Vec<K>) -> Vec<(K, V)> {
        let mut entries: Vec<(K, Pending<V>)> = keys
            .into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|pending| (key, pending)))
            .collect();
        entries.sort_by_key(|(_, pending)| (pending.deadline, pending.generation));
        entries
            .into_iter()
            .map(|(key, pending)| (key, pending.value))
            .collect()
    }
}
