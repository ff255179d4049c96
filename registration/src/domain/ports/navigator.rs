//! Port for handing control back to the surrounding application.

use crate::domain::PostRegistrationView;

/// Receives the view to open once a registration has been submitted.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Switch the surrounding application to `view`.
    fn navigate(&self, view: PostRegistrationView);
}
