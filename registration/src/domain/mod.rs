//! Domain core of the registration subsystem.
//!
//! Purpose: hold the registration state machine and the rules around it
//! without knowing how anything is stored or shown. Collaborators are reached
//! through the traits in [`ports`].
//!
//! Public surface:
//! - `BankDirectory` and `BranchCodeResolver`: bank lookup and branch code
//!   assignment.
//! - `RoleFormData` and friends: role-tagged form values and their JSON
//!   contract.
//! - `Debouncer`, `FieldAutoSaveCache` and `DraftSnapshotCache`: debounced
//!   persistence.
//! - `ValidationPolicy`: submission rules.
//! - `RegistrationFormController`: the form lifecycle.

pub mod account;
pub mod bank_directory;
pub mod branch_resolver;
pub mod controller;
pub mod debounce;
pub mod draft_cache;
pub mod field_cache;
pub mod forms;
pub mod location;
pub mod ports;
pub mod role;
pub mod storage_key;
pub mod validation;

pub use self::account::{ACCOUNT_ID_PREFIX, AccountBalances, FinalizedAccountRecord, RoleFlags};
pub use self::bank_directory::{BankDirectory, BankRecord, Branch};
pub use self::branch_resolver::{BranchCodeResolver, BranchOverride, ResolverError};
pub use self::controller::{
    ControllerDeps, ControllerSettings, FormError, FormPhase, RegistrationFormController,
    SubmitOutcome,
};
pub use self::debounce::{DebounceTicket, Debouncer};
pub use self::draft_cache::{DEFAULT_DRAFT_DEBOUNCE, DraftSnapshotCache};
pub use self::field_cache::{DEFAULT_FIELD_DEBOUNCE, FieldAutoSaveCache};
pub use self::forms::{
    AdminForm, BankingDetails, BankingField, CustomerForm, FormField, RoleFormData, VendorForm,
};
pub use self::location::{DEFAULT_LOCATION_FALLBACK, GeoPosition, describe_location};
pub use self::role::{PostRegistrationView, RegistrationRole, UnknownRoleError};
pub use self::storage_key::StorageKey;
pub use self::validation::{
    DEFAULT_ADMIN_EMAILS, FieldError, FieldErrorCode, FieldErrors, ValidationPolicy,
};
