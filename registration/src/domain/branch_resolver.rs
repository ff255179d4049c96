//! Branch code assignment for a selected bank.
//!
//! A user-confirmed override stored under `branchOverride.<bank>` wins over
//! the directory default. Unknown banks resolve to the empty string so the
//! caller can leave the branch code for manual entry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::{KeyValueStore, StorageError};
use crate::domain::{BankDirectory, StorageKey};

/// A branch code the user confirmed for a bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchOverride {
    /// Bank the override applies to.
    pub bank_name: String,
    /// Branch code to assign instead of the directory default.
    pub branch_code: String,
}

/// Errors raised when recording or clearing an override.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolverError {
    /// The bank is not listed in the directory.
    #[error("bank '{bank_name}' is not in the bank directory")]
    UnknownBank {
        /// Rejected bank name.
        bank_name: String,
    },
    /// The override carried no branch code.
    #[error("branch code for '{bank_name}' must not be blank")]
    BlankBranchCode {
        /// Bank the blank code was offered for.
        bank_name: String,
    },
    /// The store rejected the change.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Resolves branch codes against the directory and stored overrides.
#[derive(Clone)]
pub struct BranchCodeResolver {
    directory: &'static BankDirectory,
    store: Arc<dyn KeyValueStore>,
}

impl BranchCodeResolver {
    /// Create a resolver over `directory` reading overrides from `store`.
    #[must_use]
    pub fn new(directory: &'static BankDirectory, store: Arc<dyn KeyValueStore>) -> Self {
        Self { directory, store }
    }

    /// Create a resolver over the built-in directory.
    #[must_use]
    pub fn built_in(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(BankDirectory::built_in(), store)
    }

    /// The directory this resolver consults.
    #[must_use]
    pub const fn directory(&self) -> &'static BankDirectory {
        self.directory
    }

    /// Branch code for `bank_name`: the stored override, else the directory
    /// default, else `""`.
    #[must_use]
    pub fn resolve_branch_code(&self, bank_name: &str) -> String {
        if let Some(code) = self.stored_override(bank_name) {
            return code;
        }
        self.directory
            .find_bank(bank_name)
            .map(|bank| bank.default_branch_code.to_owned())
            .unwrap_or_default()
    }

    /// Persist `branch_code` as the override for `bank_name`.
    ///
    /// Recording the directory default removes any stored override instead.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::UnknownBank`] for banks outside the
    /// directory, [`ResolverError::BlankBranchCode`] for blank codes and
    /// [`ResolverError::Storage`] when the store rejects the write.
    pub fn record_override(&self, bank_name: &str, branch_code: &str) -> Result<(), ResolverError> {
        let bank = self
            .directory
            .find_bank(bank_name)
            .ok_or_else(|| ResolverError::UnknownBank {
                bank_name: bank_name.to_owned(),
            })?;
        let branch_code = branch_code.trim();
        if branch_code.is_empty() {
            return Err(ResolverError::BlankBranchCode {
                bank_name: bank_name.to_owned(),
            });
        }

        let key = StorageKey::BranchOverride(bank.name.to_owned());
        if branch_code == bank.default_branch_code {
            self.store.remove(&key)?;
            debug!(%key, "override matches directory default; removed");
            return Ok(());
        }

        let record = BranchOverride {
            bank_name: bank.name.to_owned(),
            branch_code: branch_code.to_owned(),
        };
        let encoded = serde_json::to_string(&record)
            .map_err(|error| StorageError::serialization(key.render(), error.to_string()))?;
        self.store.set(&key, &encoded)?;
        debug!(%key, "recorded branch override");
        Ok(())
    }

    /// Remove any stored override for `bank_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::UnknownBank`] for banks outside the directory
    /// and [`ResolverError::Storage`] when the store rejects the removal.
    pub fn clear_override(&self, bank_name: &str) -> Result<(), ResolverError> {
        let bank = self
            .directory
            .find_bank(bank_name)
            .ok_or_else(|| ResolverError::UnknownBank {
                bank_name: bank_name.to_owned(),
            })?;
        self.store
            .remove(&StorageKey::BranchOverride(bank.name.to_owned()))?;
        Ok(())
    }

    fn stored_override(&self, bank_name: &str) -> Option<String> {
        let key = StorageKey::BranchOverride(bank_name.to_owned());
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%key, %error, "failed to read branch override");
                return None;
            }
        };
        match serde_json::from_str::<BranchOverride>(&raw) {
            Ok(record) if !record.branch_code.trim().is_empty() => Some(record.branch_code),
            Ok(_) => None,
            Err(error) => {
                warn!(%key, %error, "ignoring corrupt branch override");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockKeyValueStore;
    use crate::test_support::RecordingStore;
    use rstest::{fixture, rstest};

    #[fixture]
    fn store() -> Arc<RecordingStore> {
        Arc::new(RecordingStore::new())
    }

    #[rstest]
    #[case("ABSA", "632005")]
    #[case("Capitec", "470010")]
    #[case("FNB", "250655")]
    #[case("Nedbank", "198765")]
    #[case("Standard Bank", "051001")]
    fn defaults_come_from_directory(
        store: Arc<RecordingStore>,
        #[case] bank: &str,
        #[case] code: &str,
    ) {
        let resolver = BranchCodeResolver::built_in(store);
        assert_eq!(resolver.resolve_branch_code(bank), code);
    }

    #[rstest]
    #[case("NonexistentBank")]
    #[case("fnb")]
    #[case("")]
    fn unknown_banks_resolve_to_empty(store: Arc<RecordingStore>, #[case] bank: &str) {
        let resolver = BranchCodeResolver::built_in(store);
        assert_eq!(resolver.resolve_branch_code(bank), "");
    }

    #[rstest]
    fn override_takes_precedence_until_cleared(store: Arc<RecordingStore>) {
        let resolver = BranchCodeResolver::built_in(store);
        resolver
            .record_override("Nedbank", "198905")
            .expect("record override");
        assert_eq!(resolver.resolve_branch_code("Nedbank"), "198905");

        resolver.clear_override("Nedbank").expect("clear override");
        assert_eq!(resolver.resolve_branch_code("Nedbank"), "198765");
    }

    #[rstest]
    fn recording_default_removes_override(store: Arc<RecordingStore>) {
        let resolver = BranchCodeResolver::built_in(store.clone());
        resolver.record_override("FNB", "255355").expect("record");
        resolver.record_override("FNB", "250655").expect("record default");

        let key = StorageKey::BranchOverride("FNB".to_owned());
        assert_eq!(store.get(&key).expect("read"), None);
        assert_eq!(resolver.resolve_branch_code("FNB"), "250655");
    }

    #[rstest]
    fn rejects_unknown_banks_and_blank_codes(store: Arc<RecordingStore>) {
        let resolver = BranchCodeResolver::built_in(store);
        assert_eq!(
            resolver.record_override("Bank of Atlantis", "000001"),
            Err(ResolverError::UnknownBank {
                bank_name: "Bank of Atlantis".to_owned()
            })
        );
        assert_eq!(
            resolver.record_override("ABSA", "   "),
            Err(ResolverError::BlankBranchCode {
                bank_name: "ABSA".to_owned()
            })
        );
    }

    #[rstest]
    fn corrupt_or_unreadable_override_falls_back_to_default() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .withf(|key| *key == StorageKey::BranchOverride("Capitec".to_owned()))
            .returning(|_| Ok(Some("\"470010\"".to_owned())));
        store
            .expect_get()
            .withf(|key| *key == StorageKey::BranchOverride("ABSA".to_owned()))
            .returning(|_| Err(StorageError::unavailable("locked")));
        let resolver = BranchCodeResolver::built_in(Arc::new(store));

        assert_eq!(resolver.resolve_branch_code("Capitec"), "470010");
        assert_eq!(resolver.resolve_branch_code("ABSA"), "632005");
    }
}
