//! `tracing`-backed sinks for notices and navigation requests.
//!
//! Hosts without a presentation layer (the operator binary, batch tooling)
//! use these to keep a structured record of what the controller reported.

use tracing::info;

use crate::domain::PostRegistrationView;
use crate::domain::ports::{Navigator, RegistrationNotice, RegistrationNotifier};

/// Logs every notice as a structured `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl RegistrationNotifier for TracingNotifier {
    fn notify(&self, notice: RegistrationNotice) {
        match &notice {
            RegistrationNotice::DraftRestored {
                role,
                restored_fields,
            } => info!(%role, fields = restored_fields.len(), "registration draft restored"),
            RegistrationNotice::ValidationFailed { role, fields } => {
                let fields: Vec<&str> = fields.iter().map(|field| field.as_str()).collect();
                info!(%role, ?fields, "registration validation failed");
            }
            RegistrationNotice::Registered { role, account_id } => {
                info!(%role, %account_id, "registration completed");
            }
        }
    }
}

/// Logs the view the host should open.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, view: PostRegistrationView) {
        info!(?view, "navigate after registration");
    }
}
