//! Submission rules for each registration flow.
//!
//! Validation never fails the caller: it produces a [`FieldErrors`] map that
//! the controller keeps beside the form and reports to the user.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{FormField, RoleFormData};

/// Admin emails accepted when no allow-list is configured.
pub const DEFAULT_ADMIN_EMAILS: [&str; 2] = ["admin@myonecard.ai", "superadmin@myonecard.ai"];

/// Machine-readable reason a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    /// The field is required but blank.
    Required,
    /// The email is not shaped like `local@domain.tld`.
    InvalidEmail,
    /// The email is not on the admin allow-list.
    UnauthorizedEmail,
}

/// A single field's validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Failure category.
    pub code: FieldErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    fn required(field: FormField) -> Self {
        Self {
            code: FieldErrorCode::Required,
            message: format!("{} is required", label(field)),
        }
    }

    fn invalid_email() -> Self {
        Self {
            code: FieldErrorCode::InvalidEmail,
            message: "Enter a valid email address".to_owned(),
        }
    }

    fn unauthorized_email() -> Self {
        Self {
            code: FieldErrorCode::UnauthorizedEmail,
            message: "Unauthorized email: this address may not register as an administrator"
                .to_owned(),
        }
    }
}

/// Validation failures keyed by field.
pub type FieldErrors = BTreeMap<FormField, FieldError>;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Rule set applied on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationPolicy {
    admin_emails: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAILS)
    }
}

impl ValidationPolicy {
    /// Build a policy accepting `admin_emails` for admin registrations.
    ///
    /// Addresses are compared case-insensitively after trimming.
    pub fn new<I, S>(admin_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let admin_emails = admin_emails
            .into_iter()
            .map(|email| email.as_ref().trim().to_ascii_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        Self { admin_emails }
    }

    /// The normalised admin allow-list.
    #[must_use]
    pub fn admin_emails(&self) -> &[String] {
        &self.admin_emails
    }

    /// Whether `email` may register as an administrator.
    #[must_use]
    pub fn is_authorized_admin(&self, email: &str) -> bool {
        let email = email.trim().to_ascii_lowercase();
        self.admin_emails.iter().any(|allowed| *allowed == email)
    }

    /// Run the full rule set for `form`.
    ///
    /// # Examples
    ///
    /// ```
    /// use registration::domain::{FormField, RegistrationRole, RoleFormData, ValidationPolicy};
    ///
    /// let mut form = RoleFormData::empty(RegistrationRole::Customer);
    /// form.set_field(FormField::FirstName, "Lerato");
    /// let errors = ValidationPolicy::default().validate(&form);
    /// assert!(errors.contains_key(&FormField::Email));
    /// assert!(!errors.contains_key(&FormField::FirstName));
    /// ```
    #[must_use]
    pub fn validate(&self, form: &RoleFormData) -> FieldErrors {
        form.fields()
            .iter()
            .filter_map(|field| self.check_field(form, *field).map(|error| (*field, error)))
            .collect()
    }

    /// Check one field of `form`, returning its error if it has one.
    #[must_use]
    pub fn check_field(&self, form: &RoleFormData, field: FormField) -> Option<FieldError> {
        let value = form.field(field)?.trim();
        if value.is_empty() {
            return form
                .required_fields()
                .contains(&field)
                .then(|| FieldError::required(field));
        }
        if field != FormField::Email {
            return None;
        }
        if !email_regex().is_match(value) {
            return Some(FieldError::invalid_email());
        }
        if matches!(form, RoleFormData::Admin(_)) && !self.is_authorized_admin(value) {
            return Some(FieldError::unauthorized_email());
        }
        None
    }
}

fn label(field: FormField) -> &'static str {
    match field {
        FormField::FirstName => "First name",
        FormField::LastName => "Last name",
        FormField::Email => "Email",
        FormField::Phone => "Phone number",
        FormField::IdNumber => "ID number",
        FormField::Address => "Address",
        FormField::BusinessName => "Business name",
        FormField::BusinessRegistrationNumber => "Business registration number",
        FormField::Department => "Department",
        FormField::BankName => "Bank name",
        FormField::AccountNumber => "Account number",
        FormField::BranchCode => "Branch code",
        FormField::RoutingNumber => "Routing number",
    }
}
