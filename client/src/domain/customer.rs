//! Customer data model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::validation::{
    FieldValue, FormData, FormRules, email, max_length, min_length, numeric_range, optional, phone,
    required,
};

/// Validation errors returned while building a [`Customer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerValidationError {
    /// Identifier was empty.
    #[error("customer id must not be empty")]
    EmptyId,
    /// Identifier carried surrounding whitespace.
    #[error("customer id must not contain surrounding whitespace")]
    InvalidId,
    /// Spend was NaN or infinite.
    #[error("total spent must be a finite number")]
    NonFiniteTotalSpent,
    /// Spend was below zero.
    #[error("total spent must not be negative")]
    NegativeTotalSpent,
    /// No creation timestamp was supplied.
    #[error("customer creation timestamp is required")]
    MissingCreatedAt,
    /// `updated_at` precedes `created_at`.
    #[error("customer updatedAt must not precede createdAt")]
    UpdatedBeforeCreated,
    /// Status string was not recognised.
    #[error("unknown customer status '{value}'")]
    UnknownStatus {
        /// Rejected input.
        value: String,
    },
}

/// Stable customer identifier assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    /// Validate and construct a [`CustomerId`].
    pub fn new(id: impl Into<String>) -> Result<Self, CustomerValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CustomerValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(CustomerValidationError::InvalidId);
        }
        Ok(Self(id))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CustomerId> for String {
    fn from(value: CustomerId) -> Self {
        value.0
    }
}

impl TryFrom<String> for CustomerId {
    type Error = CustomerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for CustomerId {
    type Err = CustomerValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Customer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    /// Paying customer.
    Active,
    /// Former customer.
    Inactive,
    /// Prospect that has not converted yet.
    Lead,
}

impl CustomerStatus {
    /// Every status in display order.
    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Lead];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Lead => "lead",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerStatus {
    type Err = CustomerValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| CustomerValidationError::UnknownStatus {
                value: value.to_owned(),
            })
    }
}

/// CRM customer record.
///
/// ## Invariants
/// - `id` is non-empty and never changes once assigned.
/// - `total_spent` is finite and non-negative; it defaults to 0 on the wire.
/// - `updated_at` is never earlier than `created_at`.
///
/// Serialises as camelCase JSON matching the customer API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CustomerDto", into = "CustomerDto")]
pub struct Customer {
    id: CustomerId,
    name: String,
    email: String,
    company: String,
    phone: Option<String>,
    status: CustomerStatus,
    total_spent: f64,
    address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Customer {
    /// Start building a customer from its required identity fields.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use crm_client::domain::{Customer, CustomerStatus};
    ///
    /// let created = Utc.with_ymd_and_hms(2024, 3, 22, 9, 0, 0).unwrap();
    /// let customer = Customer::builder("2", "Bob Martinez", "bob@designstudio.io", "Design Studio")
    ///     .status(CustomerStatus::Active)
    ///     .total_spent(28_900.0)
    ///     .created_at(created)
    ///     .build()
    ///     .expect("valid customer");
    /// assert_eq!(customer.id().as_str(), "2");
    /// assert_eq!(customer.updated_at(), created);
    /// ```
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        company: impl Into<String>,
    ) -> CustomerBuilder {
        CustomerBuilder {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            company: company.into(),
            phone: None,
            status: CustomerStatus::Lead,
            total_spent: 0.0,
            address: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Server-assigned identifier.
    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    /// Contact name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Company name.
    pub fn company(&self) -> &str {
        self.company.as_str()
    }

    /// Phone number, if recorded.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Lifecycle status.
    pub fn status(&self) -> CustomerStatus {
        self.status
    }

    /// Lifetime spend.
    pub fn total_spent(&self) -> f64 {
        self.total_spent
    }

    /// Postal address, if recorded.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Free-form notes, if recorded.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last-update timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Builder for [`Customer`]; see [`Customer::builder`].
#[derive(Debug, Clone)]
pub struct CustomerBuilder {
    id: String,
    name: String,
    email: String,
    company: String,
    phone: Option<String>,
    status: CustomerStatus,
    total_spent: f64,
    address: Option<String>,
    notes: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl CustomerBuilder {
    /// Set the phone number.
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the status (defaults to [`CustomerStatus::Lead`]).
    pub fn status(mut self, status: CustomerStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the lifetime spend (defaults to 0).
    pub fn total_spent(mut self, total_spent: f64) -> Self {
        self.total_spent = total_spent;
        self
    }

    /// Set the postal address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the notes.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the creation timestamp.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set the last-update timestamp (defaults to the creation timestamp).
    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Validate the invariants and produce the customer.
    pub fn build(self) -> Result<Customer, CustomerValidationError> {
        let id = CustomerId::new(self.id)?;
        if !self.total_spent.is_finite() {
            return Err(CustomerValidationError::NonFiniteTotalSpent);
        }
        if self.total_spent < 0.0 {
            return Err(CustomerValidationError::NegativeTotalSpent);
        }
        let created_at = self
            .created_at
            .ok_or(CustomerValidationError::MissingCreatedAt)?;
        let updated_at = self.updated_at.unwrap_or(created_at);
        if updated_at < created_at {
            return Err(CustomerValidationError::UpdatedBeforeCreated);
        }

        Ok(Customer {
            id,
            name: self.name,
            email: self.email,
            company: self.company,
            phone: self.phone,
            status: self.status,
            total_spent: self.total_spent,
            address: self.address,
            notes: self.notes,
            created_at,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerDto {
    id: String,
    name: String,
    email: String,
    company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    status: CustomerStatus,
    #[serde(default)]
    total_spent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDto {
    fn from(value: Customer) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            company: value.company,
            phone: value.phone,
            status: value.status,
            total_spent: Some(value.total_spent),
            address: value.address,
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl TryFrom<CustomerDto> for Customer {
    type Error = CustomerValidationError;

    fn try_from(value: CustomerDto) -> Result<Self, Self::Error> {
        let CustomerDto {
            id,
            name,
            email,
            company,
            phone,
            status,
            total_spent,
            address,
            notes,
            created_at,
            updated_at,
        } = value;

        let mut builder = Customer::builder(id, name, email, company)
            .status(status)
            .total_spent(total_spent.unwrap_or(0.0))
            .created_at(created_at)
            .updated_at(updated_at);
        builder.phone = phone;
        builder.address = address;
        builder.notes = notes;
        builder.build()
    }
}

/// Partial customer payload sent on create and update.
///
/// Absent fields are omitted from the JSON body so the server keeps its
/// current values on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDraft {
    /// Contact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Lifecycle status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerStatus>,
    /// Lifetime spend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<f64>,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerDraft {
    /// Form view of the draft, keyed by the camelCase wire names.
    ///
    /// Absent fields are left out so they validate as missing.
    pub fn form_data(&self) -> FormData {
        let text = |value: &Option<String>| value.clone().map(FieldValue::Text);
        [
            ("name", text(&self.name)),
            ("email", text(&self.email)),
            ("company", text(&self.company)),
            ("phone", text(&self.phone)),
            (
                "status",
                self.status.map(|status| FieldValue::from(status.as_str())),
            ),
            ("totalSpent", self.total_spent.map(FieldValue::Number)),
            ("address", text(&self.address)),
            ("notes", text(&self.notes)),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field.to_owned(), value)))
        .collect()
    }
}

/// Upper bound accepted for a customer's lifetime spend.
pub const MAX_TOTAL_SPENT: f64 = 10_000_000.0;

/// Rules applied to the customer create and edit forms.
pub fn customer_form_rules() -> FormRules {
    FormRules::new()
        .field(
            "name",
            vec![
                required("Name"),
                min_length(2, "Name"),
                max_length(100, "Name"),
            ],
        )
        .field("email", vec![required("Email"), email()])
        .field("company", vec![required("Company"), max_length(100, "Company")])
        .field("phone", vec![phone()])
        .field(
            "totalSpent",
            vec![optional(numeric_range(0.0, MAX_TOTAL_SPENT, "Total spent"))],
        )
}
