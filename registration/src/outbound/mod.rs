//! Outbound adapters implementing the domain ports.
//!
//! - **storage**: in-memory and capability-scoped file-backed key-value
//!   stores
//! - **geolocation**: fixed-position and always-unavailable geolocators
//! - **notifications**: `tracing`-backed notice and navigation sinks
//!
//! Adapters translate between domain types and their backing medium. They
//! contain no registration logic.

pub mod geolocation;
pub mod notifications;
pub mod storage;

pub use self::geolocation::{FixedGeolocator, UnavailableGeolocator};
pub use self::notifications::{TracingNavigator, TracingNotifier};
pub use self::storage::{FileStore, MemoryStore};
