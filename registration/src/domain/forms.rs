//! Role-tagged registration form data.
//!
//! Each registration flow owns an explicit form struct so the validation rules
//! in [`crate::domain::validation`] can match on the variant instead of probing
//! string-keyed bags. Forms serialise as flat camelCase JSON objects in which
//! every field defaults to the empty string; a partial draft therefore
//! restores the fields it names and leaves the rest untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::RegistrationRole;

/// Every input field offered across the three registration forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    /// Given name.
    FirstName,
    /// Family name.
    LastName,
    /// Contact email address.
    Email,
    /// Contact phone number.
    Phone,
    /// National identity number.
    IdNumber,
    /// Residential address.
    Address,
    /// Trading name of a vendor.
    BusinessName,
    /// Company registration number of a vendor.
    BusinessRegistrationNumber,
    /// Back-office department of an administrator.
    Department,
    /// Name of the bank holding the payout account.
    BankName,
    /// Payout account number.
    AccountNumber,
    /// Branch code of the payout account.
    BranchCode,
    /// Routing number of the payout account.
    RoutingNumber,
}

impl FormField {
    /// The camelCase name used in drafts and error maps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::IdNumber => "idNumber",
            Self::Address => "address",
            Self::BusinessName => "businessName",
            Self::BusinessRegistrationNumber => "businessRegistrationNumber",
            Self::Department => "department",
            Self::BankName => "bankName",
            Self::AccountNumber => "accountNumber",
            Self::BranchCode => "branchCode",
            Self::RoutingNumber => "routingNumber",
        }
    }

    /// The banking field this form field maps to, if any.
    #[must_use]
    pub const fn as_banking(self) -> Option<BankingField> {
        match self {
            Self::BankName => Some(BankingField::BankName),
            Self::AccountNumber => Some(BankingField::AccountNumber),
            Self::BranchCode => Some(BankingField::BranchCode),
            Self::RoutingNumber => Some(BankingField::RoutingNumber),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Banking fields persisted individually by the field-level auto-save cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BankingField {
    /// See [`FormField::BankName`].
    BankName,
    /// See [`FormField::AccountNumber`].
    AccountNumber,
    /// See [`FormField::BranchCode`].
    BranchCode,
    /// See [`FormField::RoutingNumber`].
    RoutingNumber,
}

impl BankingField {
    /// Every banking field.
    pub const ALL: [Self; 4] = [
        Self::BankName,
        Self::AccountNumber,
        Self::BranchCode,
        Self::RoutingNumber,
    ];

    /// The equivalent form field.
    #[must_use]
    pub const fn form_field(self) -> FormField {
        match self {
            Self::BankName => FormField::BankName,
            Self::AccountNumber => FormField::AccountNumber,
            Self::BranchCode => FormField::BranchCode,
            Self::RoutingNumber => FormField::RoutingNumber,
        }
    }

    /// The camelCase name used as the storage key suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.form_field().as_str()
    }
}

/// Payout account details shared by the vendor and admin forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankingDetails {
    /// Bank name as listed in the bank directory.
    pub bank_name: String,
    /// Account number.
    pub account_number: String,
    /// Branch code, normally assigned from the bank directory.
    pub branch_code: String,
    /// Routing number.
    pub routing_number: String,
}

impl BankingDetails {
    fn field_mut(&mut self, field: BankingField) -> &mut String {
        match field {
            BankingField::BankName => &mut self.bank_name,
            BankingField::AccountNumber => &mut self.account_number,
            BankingField::BranchCode => &mut self.branch_code,
            BankingField::RoutingNumber => &mut self.routing_number,
        }
    }

    /// Borrow the value of a banking field.
    #[must_use]
    pub fn get(&self, field: BankingField) -> &str {
        match field {
            BankingField::BankName => &self.bank_name,
            BankingField::AccountNumber => &self.account_number,
            BankingField::BranchCode => &self.branch_code,
            BankingField::RoutingNumber => &self.routing_number,
        }
    }

    /// Overwrite a banking field.
    pub fn set(&mut self, field: BankingField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }
}

/// Customer registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// National identity number (optional).
    pub id_number: String,
    /// Residential address (optional).
    pub address: String,
}

/// Vendor registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorForm {
    /// Trading name.
    pub business_name: String,
    /// Company registration number (optional).
    pub business_registration_number: String,
    /// Given name of the contact person.
    pub first_name: String,
    /// Family name of the contact person.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Payout account.
    #[serde(flatten)]
    pub banking: BankingDetails,
}

/// Administrator registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email; must be on the admin allow-list.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Department (optional).
    pub department: String,
    /// Payout account.
    #[serde(flatten)]
    pub banking: BankingDetails,
}

const CUSTOMER_FIELDS: &[FormField] = &[
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
    FormField::IdNumber,
    FormField::Address,
];
const CUSTOMER_REQUIRED: &[FormField] = &[
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
];
const VENDOR_FIELDS: &[FormField] = &[
    FormField::BusinessName,
    FormField::BusinessRegistrationNumber,
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
    FormField::BankName,
    FormField::AccountNumber,
    FormField::BranchCode,
    FormField::RoutingNumber,
];
const VENDOR_REQUIRED: &[FormField] = &[
    FormField::BusinessName,
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
    FormField::BankName,
    FormField::AccountNumber,
];
const ADMIN_FIELDS: &[FormField] = &[
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
    FormField::Department,
    FormField::BankName,
    FormField::AccountNumber,
    FormField::BranchCode,
    FormField::RoutingNumber,
];
const ADMIN_REQUIRED: &[FormField] = &[
    FormField::FirstName,
    FormField::LastName,
    FormField::Email,
    FormField::Phone,
    FormField::BankName,
    FormField::AccountNumber,
];

/// In-progress registration data, tagged by role.
///
/// Serialises as the flat object of the active variant; the role travels
/// beside it (in the storage key or the account record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RoleFormData {
    /// Customer flow.
    Customer(CustomerForm),
    /// Vendor flow.
    Vendor(VendorForm),
    /// Admin flow.
    Admin(AdminForm),
}

impl RoleFormData {
    /// A blank form for `role`.
    #[must_use]
    pub fn empty(role: RegistrationRole) -> Self {
        match role {
            RegistrationRole::Customer => Self::Customer(CustomerForm::default()),
            RegistrationRole::Vendor => Self::Vendor(VendorForm::default()),
            RegistrationRole::Admin => Self::Admin(AdminForm::default()),
        }
    }

    /// The role this form belongs to.
    #[must_use]
    pub const fn role(&self) -> RegistrationRole {
        match self {
            Self::Customer(_) => RegistrationRole::Customer,
            Self::Vendor(_) => RegistrationRole::Vendor,
            Self::Admin(_) => RegistrationRole::Admin,
        }
    }

    /// Fields offered by this form, in display order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FormField] {
        match self {
            Self::Customer(_) => CUSTOMER_FIELDS,
            Self::Vendor(_) => VENDOR_FIELDS,
            Self::Admin(_) => ADMIN_FIELDS,
        }
    }

    /// Fields that must be non-blank before submission.
    #[must_use]
    pub const fn required_fields(&self) -> &'static [FormField] {
        match self {
            Self::Customer(_) => CUSTOMER_REQUIRED,
            Self::Vendor(_) => VENDOR_REQUIRED,
            Self::Admin(_) => ADMIN_REQUIRED,
        }
    }

    /// Whether `field` belongs to this form.
    #[must_use]
    pub fn has_field(&self, field: FormField) -> bool {
        self.fields().contains(&field)
    }

    /// Current value of `field`, or `None` when the form has no such field.
    #[must_use]
    pub fn field(&self, field: FormField) -> Option<&str> {
        if let Some(banking_field) = field.as_banking() {
            return self.banking().map(|banking| banking.get(banking_field));
        }
        let value = match (self, field) {
            (Self::Customer(form), FormField::FirstName) => &form.first_name,
            (Self::Customer(form), FormField::LastName) => &form.last_name,
            (Self::Customer(form), FormField::Email) => &form.email,
            (Self::Customer(form), FormField::Phone) => &form.phone,
            (Self::Customer(form), FormField::IdNumber) => &form.id_number,
            (Self::Customer(form), FormField::Address) => &form.address,
            (Self::Vendor(form), FormField::BusinessName) => &form.business_name,
            (Self::Vendor(form), FormField::BusinessRegistrationNumber) => {
                &form.business_registration_number
            }
            (Self::Vendor(form), FormField::FirstName) => &form.first_name,
            (Self::Vendor(form), FormField::LastName) => &form.last_name,
            (Self::Vendor(form), FormField::Email) => &form.email,
            (Self::Vendor(form), FormField::Phone) => &form.phone,
            (Self::Admin(form), FormField::FirstName) => &form.first_name,
            (Self::Admin(form), FormField::LastName) => &form.last_name,
            (Self::Admin(form), FormField::Email) => &form.email,
            (Self::Admin(form), FormField::Phone) => &form.phone,
            (Self::Admin(form), FormField::Department) => &form.department,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Overwrite `field`, returning `false` when the form has no such field.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> bool {
        match self.field_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    fn field_mut(&mut self, field: FormField) -> Option<&mut String> {
        if let Some(banking_field) = field.as_banking() {
            return self
                .banking_mut()
                .map(|banking| banking.field_mut(banking_field));
        }
        let slot = match (self, field) {
            (Self::Customer(form), FormField::FirstName) => &mut form.first_name,
            (Self::Customer(form), FormField::LastName) => &mut form.last_name,
            (Self::Customer(form), FormField::Email) => &mut form.email,
            (Self::Customer(form), FormField::Phone) => &mut form.phone,
            (Self::Customer(form), FormField::IdNumber) => &mut form.id_number,
            (Self::Customer(form), FormField::Address) => &mut form.address,
            (Self::Vendor(form), FormField::BusinessName) => &mut form.business_name,
            (Self::Vendor(form), FormField::BusinessRegistrationNumber) => {
                &mut form.business_registration_number
            }
            (Self::Vendor(form), FormField::FirstName) => &mut form.first_name,
            (Self::Vendor(form), FormField::LastName) => &mut form.last_name,
            (Self::Vendor(form), FormField::Email) => &mut form.email,
            (Self::Vendor(form), FormField::Phone) => &mut form.phone,
            (Self::Admin(form), FormField::FirstName) => &mut form.first_name,
            (Self::Admin(form), FormField::LastName) => &mut form.last_name,
            (Self::Admin(form), FormField::Email) => &mut form.email,
            (Self::Admin(form), FormField::Phone) => &mut form.phone,
            (Self::Admin(form), FormField::Department) => &mut form.department,
            _ => return None,
        };
        Some(slot)
    }

    /// Banking details, for the roles that carry them.
    #[must_use]
    pub const fn banking(&self) -> Option<&BankingDetails> {
        match self {
            Self::Customer(_) => None,
            Self::Vendor(form) => Some(&form.banking),
            Self::Admin(form) => Some(&form.banking),
        }
    }

    fn banking_mut(&mut self) -> Option<&mut BankingDetails> {
        match self {
            Self::Customer(_) => None,
            Self::Vendor(form) => Some(&mut form.banking),
            Self::Admin(form) => Some(&mut form.banking),
        }
    }

    /// Whether every field is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.fields()
            .iter()
            .all(|field| self.field(*field).is_none_or(|value| value.trim().is_empty()))
    }

    /// Serialise the form as a flat JSON object.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; the form types contain only strings, so
    /// this does not fail in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Customer(form) => serde_json::to_string(form),
            Self::Vendor(form) => serde_json::to_string(form),
            Self::Admin(form) => serde_json::to_string(form),
        }
    }

    /// Serialise the form as a JSON value.
    ///
    /// # Errors
    ///
    /// See [`RoleFormData::to_json`].
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Customer(form) => serde_json::to_value(form),
            Self::Vendor(form) => serde_json::to_value(form),
            Self::Admin(form) => serde_json::to_value(form),
        }
    }

    /// Parse a flat JSON object into the form for `role`.
    ///
    /// Missing fields keep their defaults; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns the parser error when `json` is not an object of strings.
    ///
    /// # Examples
    ///
    /// ```
    /// use registration::domain::{FormField, RegistrationRole, RoleFormData};
    ///
    /// let form = RoleFormData::from_json(
    ///     RegistrationRole::Vendor,
    ///     r#"{"firstName":"Thabo","bankName":"FNB"}"#,
    /// )
    /// .expect("valid draft");
    /// assert_eq!(form.field(FormField::BankName), Some("FNB"));
    /// assert_eq!(form.field(FormField::Email), Some(""));
    /// ```
    pub fn from_json(role: RegistrationRole, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match role {
            RegistrationRole::Customer => Self::Customer(serde_json::from_str(json)?),
            RegistrationRole::Vendor => Self::Vendor(serde_json::from_str(json)?),
            RegistrationRole::Admin => Self::Admin(serde_json::from_str(json)?),
        })
    }
}
