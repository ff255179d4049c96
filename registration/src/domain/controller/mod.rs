//! Registration form controller.
//!
//! The controller owns the in-memory form for one role and coordinates the
//! collaborators around it:
//! - restoring a draft and the banking auto-save fields on mount;
//! - scheduling debounced writes to both caches on every edit;
//! - assigning branch codes when a bank is selected;
//! - validating, recording and announcing a submission.
//!
//! Time only advances through the injected [`Clock`]; callers drive pending
//! writes with [`RegistrationFormController::tick`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::location::{DEFAULT_LOCATION_FALLBACK, describe_location};
use crate::domain::ports::{
    Geolocator, KeyValueStore, Navigator, RegistrationNotice, RegistrationNotifier,
};
use crate::domain::{
    BranchCodeResolver, DEFAULT_DRAFT_DEBOUNCE, DEFAULT_FIELD_DEBOUNCE, DraftSnapshotCache,
    FieldAutoSaveCache, FieldErrors, FinalizedAccountRecord, FormField, RegistrationRole,
    RoleFormData, StorageKey, ValidationPolicy,
};

#[cfg(test)]
mod tests;

/// Lifecycle of a registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Accepting edits.
    Editing,
    /// Running the rule set during [`RegistrationFormController::submit`].
    Validating,
    /// Writing the account record during [`RegistrationFormController::submit`].
    Submitting,
    /// Registration completed; the form is read-only.
    Submitted,
}

/// Misuse of the controller API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The field does not exist on the role's form.
    #[error("{field} is not part of the {role} registration form")]
    FieldNotApplicable {
        /// Role of the form.
        role: RegistrationRole,
        /// Rejected field.
        field: FormField,
    },
    /// The form was already submitted.
    #[error("the {role} registration has already been submitted")]
    AlreadySubmitted {
        /// Role of the form.
        role: RegistrationRole,
    },
}

/// Result of a submission attempt that reached validation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was written.
    Rejected {
        /// Errors now shown beside the form.
        errors: FieldErrors,
    },
    /// The account was created.
    Registered {
        /// Record written to the store.
        record: FinalizedAccountRecord,
    },
}

/// Tunables for a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Quiet period for banking field auto-save.
    pub field_debounce: Duration,
    /// Quiet period for whole-form drafts.
    pub draft_debounce: Duration,
    /// Location text used when geolocation fails.
    pub location_fallback: String,
    /// Submission rules.
    pub policy: ValidationPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            field_debounce: DEFAULT_FIELD_DEBOUNCE,
            draft_debounce: DEFAULT_DRAFT_DEBOUNCE,
            location_fallback: DEFAULT_LOCATION_FALLBACK.to_owned(),
            policy: ValidationPolicy::default(),
        }
    }
}

/// Collaborators handed to [`RegistrationFormController::mount`].
#[derive(Clone)]
pub struct ControllerDeps {
    /// Durable store shared by both caches and the resolver.
    pub store: Arc<dyn KeyValueStore>,
    /// Time source for debounce deadlines and timestamps.
    pub clock: Arc<dyn Clock>,
    /// Sink for user-facing notices.
    pub notifier: Arc<dyn RegistrationNotifier>,
    /// Post-registration navigation.
    pub navigator: Arc<dyn Navigator>,
    /// Position lookup for the display-only location.
    pub geolocator: Arc<dyn Geolocator>,
    /// Tunables.
    pub settings: ControllerSettings,
}

impl ControllerDeps {
    /// Bundle collaborators with default settings.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn RegistrationNotifier>,
        navigator: Arc<dyn Navigator>,
        geolocator: Arc<dyn Geolocator>,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            navigator,
            geolocator,
            settings: ControllerSettings::default(),
        }
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Stateful controller for one registration form.
pub struct RegistrationFormController {
    form: RoleFormData,
    errors: FieldErrors,
    phase: FormPhase,
    location: String,
    record: Option<FinalizedAccountRecord>,
    resolver: BranchCodeResolver,
    field_cache: FieldAutoSaveCache,
    draft_cache: DraftSnapshotCache,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn RegistrationNotifier>,
    navigator: Arc<dyn Navigator>,
    policy: ValidationPolicy,
}

impl RegistrationFormController {
    /// Open the form for `role`, restoring any saved state.
    ///
    /// The role's draft is loaded first; for roles with banking details the
    /// auto-saved banking fields are laid over it. A
    /// [`RegistrationNotice::DraftRestored`] is sent when any field came back
    /// non-blank. Geolocation is queried once.
    #[must_use]
    pub fn mount(role: RegistrationRole, deps: ControllerDeps) -> Self {
        let ControllerDeps {
            store,
            clock,
            notifier,
            navigator,
            geolocator,
            settings,
        } = deps;
        let field_cache = FieldAutoSaveCache::new(Arc::clone(&store), settings.field_debounce);
        let draft_cache = DraftSnapshotCache::new(Arc::clone(&store), settings.draft_debounce);

        let mut form = draft_cache
            .load_draft(role)
            .unwrap_or_else(|| RoleFormData::empty(role));
        if role.has_banking_details() {
            for (field, value) in field_cache.load_all() {
                form.set_field(field.form_field(), value);
            }
        }

        let restored_fields: Vec<FormField> = form
            .fields()
            .iter()
            .copied()
            .filter(|field| form.field(*field).is_some_and(|value| !value.trim().is_empty()))
            .collect();
        if !restored_fields.is_empty() {
            debug!(%role, restored = restored_fields.len(), "restored registration state");
            notifier.notify(RegistrationNotice::DraftRestored {
                role,
                restored_fields,
            });
        }

        let location = describe_location(geolocator.as_ref(), &settings.location_fallback);

        Self {
            form,
            errors: FieldErrors::new(),
            phase: FormPhase::Editing,
            location,
            record: None,
            resolver: BranchCodeResolver::built_in(Arc::clone(&store)),
            field_cache,
            draft_cache,
            store,
            clock,
            notifier,
            navigator,
            policy: settings.policy,
        }
    }

    /// Role of the form.
    #[must_use]
    pub const fn role(&self) -> RegistrationRole {
        self.form.role()
    }

    /// Current form values.
    #[must_use]
    pub const fn form(&self) -> &RoleFormData {
        &self.form
    }

    /// Validation errors from the last rejected submission that are still
    /// outstanding.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Display-only location captured on mount.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The account record, once submitted.
    #[must_use]
    pub const fn record(&self) -> Option<&FinalizedAccountRecord> {
        self.record.as_ref()
    }

    /// Earliest deadline among pending writes.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        match (self.field_cache.next_deadline(), self.draft_cache.next_deadline()) {
            (Some(field), Some(draft)) => Some(field.min(draft)),
            (field, draft) => field.or(draft),
        }
    }

    /// Update `field` and schedule the debounced saves for it.
    ///
    /// An outstanding error on the field is cleared once the new value
    /// passes its rule.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::AlreadySubmitted`] after submission and
    /// [`FormError::FieldNotApplicable`] when the role's form has no such
    /// field.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), FormError> {
        self.ensure_editable()?;
        let value = value.into();
        if !self.form.set_field(field, value.clone()) {
            return Err(FormError::FieldNotApplicable {
                role: self.role(),
                field,
            });
        }
        if self.errors.contains_key(&field) && self.policy.check_field(&self.form, field).is_none()
        {
            self.errors.remove(&field);
        }

        let now = self.clock.utc();
        self.draft_cache.save_draft(self.form.clone(), now);
        if let Some(banking_field) = field.as_banking() {
            self.field_cache.save_field(banking_field, value, now);
        }
        Ok(())
    }

    /// Select a bank and assign its branch code.
    ///
    /// Returns the assigned code, empty for banks outside the directory.
    ///
    /// # Errors
    ///
    /// See [`RegistrationFormController::set_field`]; customer forms have no
    /// bank fields.
    pub fn select_bank(&mut self, bank_name: &str) -> Result<String, FormError> {
        self.set_field(FormField::BankName, bank_name)?;
        let branch_code = self.resolver.resolve_branch_code(bank_name);
        self.set_field(FormField::BranchCode, branch_code.clone())?;
        debug!(bank = bank_name, %branch_code, "assigned branch code");
        Ok(branch_code)
    }

    /// Flush every debounced write whose deadline has passed.
    ///
    /// Returns the number of successful writes.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.utc();
        self.field_cache.flush_due(now) + self.draft_cache.flush_due(now)
    }

    /// Flush every pending write regardless of deadline.
    pub fn flush_pending(&mut self) -> usize {
        self.field_cache.flush_all() + self.draft_cache.flush_all()
    }

    /// Validate and, when valid, complete the registration.
    ///
    /// A rejected form returns to [`FormPhase::Editing`] with its errors
    /// recorded and nothing written. A valid form is recorded under the
    /// role's account key; pending saves are cancelled, the draft and (for
    /// roles with banking details) the banking auto-save fields are removed,
    /// the authentication flag is set and the navigator is asked to open the
    /// role's landing view. Persistence failures during completion are
    /// logged and do not stop it.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::AlreadySubmitted`] when called after a
    /// successful submission.
    pub fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        self.ensure_editable()?;
        let role = self.role();

        self.phase = FormPhase::Validating;
        let errors = self.policy.validate(&self.form);
        if !errors.is_empty() {
            self.phase = FormPhase::Editing;
            self.errors.clone_from(&errors);
            info!(%role, failures = errors.len(), "registration rejected by validation");
            self.notifier.notify(RegistrationNotice::ValidationFailed {
                role,
                fields: errors.keys().copied().collect(),
            });
            return Ok(SubmitOutcome::Rejected { errors });
        }
        self.errors.clear();

        self.phase = FormPhase::Submitting;
        let record =
            FinalizedAccountRecord::new(self.form.clone(), self.clock.utc(), self.location.clone());
        self.write_record(&record);
        self.draft_cache.clear_draft(role);
        if role.has_banking_details() {
            self.field_cache.clear();
        }
        self.write_authenticated_flag(role);

        info!(%role, account_id = %record.account_id, "registration completed");
        self.notifier.notify(RegistrationNotice::Registered {
            role,
            account_id: record.account_id.clone(),
        });
        self.navigator.navigate(role.post_registration_view());

        self.phase = FormPhase::Submitted;
        self.record = Some(record.clone());
        Ok(SubmitOutcome::Registered { record })
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        if self.phase == FormPhase::Submitted {
            return Err(FormError::AlreadySubmitted { role: self.role() });
        }
        Ok(())
    }

    fn write_record(&self, record: &FinalizedAccountRecord) {
        let key = StorageKey::FinalizedAccount(record.role);
        let result = record
            .to_json()
            .map_err(|error| error.to_string())
            .and_then(|encoded| {
                self.store
                    .set(&key, &encoded)
                    .map_err(|error| error.to_string())
            });
        if let Err(error) = result {
            warn!(%key, %error, "failed to persist account record; continuing in memory");
        }
    }

    fn write_authenticated_flag(&self, role: RegistrationRole) {
        let key = StorageKey::Authenticated(role);
        if let Err(error) = self.store.set(&key, "true") {
            warn!(%key, %error, "failed to persist authentication flag");
        }
    }
}
