//! Keys used in the durable key-value store.
//!
//! Each cache writes into its own namespace so the field-level and draft
//! caches never touch the same entry.

use std::fmt;

use crate::domain::{BankingField, RegistrationRole};

/// Namespace prefix for per-role registration drafts.
pub const DRAFT_NAMESPACE: &str = "registrationDraft";
/// Namespace prefix for the shared banking auto-save fields.
pub const BANKING_NAMESPACE: &str = "bankingAutoSave";
/// Namespace prefix for user-confirmed branch overrides.
pub const OVERRIDE_NAMESPACE: &str = "branchOverride";

/// Every entry the registration subsystem persists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Whole-form snapshot for one role.
    Draft(RegistrationRole),
    /// One banking field in the shared auto-save namespace.
    BankingField(BankingField),
    /// User-confirmed branch code for a bank.
    BranchOverride(String),
    /// Finalized account written on submission.
    FinalizedAccount(RegistrationRole),
    /// Boolean flag read by the surrounding navigation logic.
    Authenticated(RegistrationRole),
}

impl StorageKey {
    /// Render the key as stored.
    ///
    /// # Examples
    ///
    /// ```
    /// use registration::domain::{BankingField, RegistrationRole, StorageKey};
    ///
    /// assert_eq!(
    ///     StorageKey::Draft(RegistrationRole::Vendor).render(),
    ///     "registrationDraft.vendor"
    /// );
    /// assert_eq!(
    ///     StorageKey::BankingField(BankingField::BranchCode).render(),
    ///     "bankingAutoSave.branchCode"
    /// );
    /// assert_eq!(
    ///     StorageKey::FinalizedAccount(RegistrationRole::Admin).render(),
    ///     "onecardAdmin"
    /// );
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Draft(role) => format!("{DRAFT_NAMESPACE}.{role}"),
            Self::BankingField(field) => format!("{BANKING_NAMESPACE}.{}", field.as_str()),
            Self::BranchOverride(bank) => format!("{OVERRIDE_NAMESPACE}.{bank}"),
            Self::FinalizedAccount(role) => format!("onecard{}", capitalised(*role)),
            Self::Authenticated(role) => format!("{role}Authenticated"),
        }
    }
}

fn capitalised(role: RegistrationRole) -> &'static str {
    match role {
        RegistrationRole::Customer => "Customer",
        RegistrationRole::Vendor => "Vendor",
        RegistrationRole::Admin => "Admin",
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
