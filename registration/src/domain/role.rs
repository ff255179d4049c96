//! Registration roles and the views each role lands on after registering.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three registration flows offered by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationRole {
    /// Retail subscriber.
    Customer,
    /// Airtime/data reseller.
    Vendor,
    /// Back-office administrator.
    Admin,
}

impl RegistrationRole {
    /// Every role, in wizard order.
    pub const ALL: [Self; 3] = [Self::Customer, Self::Vendor, Self::Admin];

    /// Lower-case identifier used in storage keys and the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Vendor => "vendor",
            Self::Admin => "admin",
        }
    }

    /// Whether the role's form carries banking details.
    #[must_use]
    pub const fn has_banking_details(self) -> bool {
        matches!(self, Self::Vendor | Self::Admin)
    }

    /// View the surrounding application opens once this role has registered.
    #[must_use]
    pub const fn post_registration_view(self) -> PostRegistrationView {
        match self {
            Self::Customer => PostRegistrationView::CustomerDashboard,
            Self::Vendor => PostRegistrationView::VendorPortal,
            Self::Admin => PostRegistrationView::NerveCenter,
        }
    }
}

impl fmt::Display for RegistrationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registration role: {value}")]
pub struct UnknownRoleError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for RegistrationRole {
    type Err = UnknownRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownRoleError {
                value: value.to_owned(),
            })
    }
}

/// Target view signalled to the navigation collaborator after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostRegistrationView {
    /// Self-service customer dashboard.
    CustomerDashboard,
    /// Vendor sales portal.
    VendorPortal,
    /// Tabbed admin console.
    NerveCenter,
}
