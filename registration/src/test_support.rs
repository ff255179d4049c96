//! Test utilities for the registration crate.
//!
//! These doubles are shared by unit tests (in `src/`) and the behaviour
//! suites (in `tests/`). They are compiled for tests and behind the
//! `test-support` feature.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use camino::Utf8Path;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::domain::ports::{
    KeyValueStore, Navigator, RegistrationNotice, RegistrationNotifier, StorageError,
};
use crate::domain::{PostRegistrationView, StorageKey};
use crate::outbound::FileStore;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned"),
    }
}

/// Clock whose time only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0, "clock") += delta;
    }

    /// Move the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        *lock(&self.0, "clock") += TimeDelta::milliseconds(millis);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

#[derive(Default)]
struct RecordingState {
    entries: HashMap<String, String>,
    writes: Vec<String>,
    rejected: Vec<String>,
}

/// In-memory store that journals every successful write.
#[derive(Default)]
pub struct RecordingStore(Mutex<RecordingState>);

impl RecordingStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later write to `key` fail with a quota error.
    pub fn reject_writes_to(&self, key: StorageKey) {
        lock(&self.0, "store").rejected.push(key.render());
    }

    /// Number of successful writes to `key`.
    pub fn write_count(&self, key: &StorageKey) -> usize {
        let rendered = key.render();
        lock(&self.0, "store")
            .writes
            .iter()
            .filter(|written| **written == rendered)
            .count()
    }

    /// Keys written so far, in write order.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.0, "store").writes.clone()
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &StorageKey) -> Option<String> {
        lock(&self.0, "store").entries.get(&key.render()).cloned()
    }

    /// Whether `key` currently holds a value.
    pub fn contains(&self, key: &StorageKey) -> bool {
        lock(&self.0, "store").entries.contains_key(&key.render())
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        let rendered = key.render();
        let mut state = lock(&self.0, "store");
        if state.rejected.contains(&rendered) {
            return Err(StorageError::quota_exceeded(rendered, value.len()));
        }
        state.entries.insert(rendered.clone(), value.to_owned());
        state.writes.push(rendered);
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        lock(&self.0, "store").entries.remove(&key.render());
        Ok(())
    }
}

/// Notifier that keeps every notice it receives.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<RegistrationNotice>>);

impl RecordingNotifier {
    /// Notices received so far, oldest first.
    pub fn notices(&self) -> Vec<RegistrationNotice> {
        lock(&self.0, "notifier").clone()
    }
}

impl RegistrationNotifier for RecordingNotifier {
    fn notify(&self, notice: RegistrationNotice) {
        lock(&self.0, "notifier").push(notice);
    }
}

/// Navigator that keeps every requested view.
#[derive(Default)]
pub struct RecordingNavigator(Mutex<Vec<PostRegistrationView>>);

impl RecordingNavigator {
    /// Views requested so far, oldest first.
    pub fn views(&self) -> Vec<PostRegistrationView> {
        lock(&self.0, "navigator").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, view: PostRegistrationView) {
        lock(&self.0, "navigator").push(view);
    }
}

/// A [`FileStore`] rooted in a fresh temporary directory.
///
/// The directory is deleted when the returned guard is dropped.
///
/// # Errors
///
/// Returns any I/O error raised while creating or opening the directory.
pub fn temp_file_store() -> io::Result<(TempDir, FileStore)> {
    let dir = tempfile::tempdir()?;
    let path = Utf8Path::from_path(dir.path())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "temp dir is not UTF-8"))?;
    let store = FileStore::open(path)?;
    Ok((dir, store))
}
