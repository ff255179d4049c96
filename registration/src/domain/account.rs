//! Finalized account records written on successful registration.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{RegistrationRole, RoleFormData};

/// Prefix of every generated account identifier.
pub const ACCOUNT_ID_PREFIX: &str = "OC-";

/// Opening balances of a new account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalances {
    /// Wallet balance in cents.
    pub wallet_cents: u64,
    /// Airtime balance in cents.
    pub airtime_cents: u64,
    /// Data bundle balance in megabytes.
    pub data_megabytes: u64,
}

/// Capability flags derived from the registration role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    /// Access to the admin console.
    pub admin: bool,
    /// Access to the vendor portal.
    pub vendor: bool,
}

impl RoleFlags {
    /// Flags granted to `role`.
    #[must_use]
    pub const fn for_role(role: RegistrationRole) -> Self {
        Self {
            admin: matches!(role, RegistrationRole::Admin),
            vendor: matches!(role, RegistrationRole::Vendor),
        }
    }
}

/// The account persisted under `onecard<Role>` once a form is submitted.
///
/// Serialises as the form's own fields plus the generated ones, in a single
/// flat camelCase object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedAccountRecord {
    /// Generated identifier, `OC-` followed by a simple-form UUID.
    pub account_id: String,
    /// Registration flow that produced the account.
    pub role: RegistrationRole,
    /// Submitted form values.
    #[serde(flatten)]
    pub form: RoleFormData,
    /// Opening balances.
    pub balances: AccountBalances,
    /// Role capability flags.
    pub flags: RoleFlags,
    /// When the registration completed.
    pub registered_at: DateTime<Utc>,
    /// Display-only location captured on mount.
    pub location: String,
}

impl FinalizedAccountRecord {
    /// Build a record for `form` with a fresh identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use registration::domain::{FinalizedAccountRecord, RegistrationRole, RoleFormData};
    ///
    /// let form = RoleFormData::empty(RegistrationRole::Vendor);
    /// let record = FinalizedAccountRecord::new(form, Utc::now(), "Location unavailable");
    /// assert!(record.account_id.starts_with("OC-"));
    /// assert!(record.flags.vendor);
    /// ```
    #[must_use]
    pub fn new(form: RoleFormData, registered_at: DateTime<Utc>, location: impl Into<String>) -> Self {
        let role = form.role();
        Self {
            account_id: format!("{ACCOUNT_ID_PREFIX}{}", Uuid::new_v4().simple()),
            role,
            form,
            balances: AccountBalances::default(),
            flags: RoleFlags::for_role(role),
            registered_at,
            location: location.into(),
        }
    }

    /// Serialise the record as stored.
    ///
    /// # Errors
    ///
    /// Returns the serializer error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
