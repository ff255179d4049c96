//! Port for user-facing status notices.
//!
//! The presentation layer decides how (and in which language) to render a
//! notice; the domain only reports which event happened.

use serde::Serialize;

use crate::domain::{FormField, RegistrationRole};

/// Events the form controller reports to the presentation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RegistrationNotice {
    /// A previously saved draft was loaded into the form on mount.
    #[serde(rename_all = "camelCase")]
    DraftRestored {
        /// Flow that restored the draft.
        role: RegistrationRole,
        /// Fields that received a non-blank value.
        restored_fields: Vec<FormField>,
    },
    /// Submission was refused by validation.
    #[serde(rename_all = "camelCase")]
    ValidationFailed {
        /// Flow that failed validation.
        role: RegistrationRole,
        /// Fields with errors, in form order.
        fields: Vec<FormField>,
    },
    /// Registration completed and the account record was written.
    #[serde(rename_all = "camelCase")]
    Registered {
        /// Flow that completed.
        role: RegistrationRole,
        /// Identifier of the new account.
        account_id: String,
    },
}

/// Sink for [`RegistrationNotice`]s.
#[cfg_attr(test, mockall::automock)]
pub trait RegistrationNotifier: Send + Sync {
    /// Publish a notice. Delivery is best-effort and never fails the caller.
    fn notify(&self, notice: RegistrationNotice);
}
