//! Registration draft persistence and bank/branch auto-assignment.
//!
//! The crate is a small hexagon. `domain` owns the bank directory, the
//! branch-code resolver, the role-tagged registration forms, the debounced
//! caches and the form controller. `domain::ports` declares the storage,
//! notification, navigation and geolocation seams, and `outbound` provides
//! adapters for them. `config` loads runtime settings via OrthoConfig.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mockable::DefaultClock;
//! use registration::domain::{
//!     ControllerDeps, FormField, RegistrationFormController, RegistrationRole,
//! };
//! use registration::outbound::{
//!     MemoryStore, TracingNavigator, TracingNotifier, UnavailableGeolocator,
//! };
//!
//! let deps = ControllerDeps::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(DefaultClock),
//!     Arc::new(TracingNotifier),
//!     Arc::new(TracingNavigator),
//!     Arc::new(UnavailableGeolocator),
//! );
//! let mut controller = RegistrationFormController::mount(RegistrationRole::Vendor, deps);
//! controller.select_bank("Standard Bank").expect("vendor forms carry banking fields");
//! assert_eq!(controller.form().field(FormField::BranchCode), Some("051001"));
//! ```

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::RegistrationSettings;
