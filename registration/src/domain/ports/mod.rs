//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod geolocator;
mod key_value_store;
mod navigator;
mod notifier;

#[cfg(test)]
pub use geolocator::MockGeolocator;
pub use geolocator::{GeolocationError, Geolocator};
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{KeyValueStore, StorageError};
#[cfg(test)]
pub use navigator::MockNavigator;
pub use navigator::Navigator;
#[cfg(test)]
pub use notifier::MockRegistrationNotifier;
pub use notifier::{RegistrationNotice, RegistrationNotifier};
