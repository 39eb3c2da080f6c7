//! Composable form validation.
//!
//! A [`Validator`] is a pure function from a [`FieldValue`] to a
//! [`ValidationResult`]. Validators are combined per field with [`validate`]
//! (first failure wins) and per form with [`validate_form`], which reports the
//! first message for every failing field. Nothing here has side effects:
//! calling the same validators with the same input always yields the same
//! output.
//!
//! # Examples
//! ```
//! use crm_client::domain::validation::{
//!     FieldValue, ValidationResult, min_length, required, validate,
//! };
//!
//! let result = validate(
//!     &FieldValue::from("abc"),
//!     &[required("Field"), min_length(5, "Name")],
//! );
//! assert_eq!(
//!     result,
//!     ValidationResult::invalid("Name must be at least 5 characters"),
//! );
//! ```

mod rules;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use self::rules::{
    DEFAULT_FIELD_NAME, DEFAULT_VALUE_NAME, email, max_length, min_length, numeric_range,
    optional, phone, required,
};

/// Dynamically shaped form input.
///
/// Forms hand the engine whatever the user typed or picked, so values are
/// loosely typed. `Missing` stands for an absent or cleared input.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// No value supplied.
    #[default]
    Missing,
    /// Free text.
    Text(String),
    /// Numeric input.
    Number(f64),
    /// Checkbox or toggle.
    Bool(bool),
    /// Multi-select input.
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Borrow the text content when the value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Numeric interpretation of the value.
    ///
    /// Numbers pass through, booleans become 1 or 0, text is trimmed and
    /// parsed as a decimal (blank text counts as 0). Missing values and lists
    /// have no numeric reading.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|value| !value.is_nan()),
            Self::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok().filter(|value| !value.is_nan())
                }
            }
            Self::Missing | Self::List(_) => None,
        }
    }

    fn is_empty_input(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// Outcome of running one or more validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The value passed.
    Valid,
    /// The value failed with a user-facing message.
    Invalid {
        /// Message shown next to the field.
        message: String,
    },
}

impl ValidationResult {
    /// Build a failure carrying `message`.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Whether the value passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { message } => Some(message.as_str()),
        }
    }
}

type Check = dyn Fn(&FieldValue) -> ValidationResult + Send + Sync;

/// A pure field check.
///
/// Cloning is cheap; clones share the same check.
#[derive(Clone)]
pub struct Validator {
    check: Arc<Check>,
}

impl Validator {
    /// Wrap a custom check.
    ///
    /// # Examples
    /// ```
    /// use crm_client::domain::validation::{FieldValue, ValidationResult, Validator};
    ///
    /// let no_spaces = Validator::new(|value| match value.as_text() {
    ///     Some(text) if text.contains(' ') => ValidationResult::invalid("No spaces"),
    ///     _ => ValidationResult::Valid,
    /// });
    /// assert!(!no_spaces.check(&FieldValue::from("a b")).is_valid());
    /// ```
    pub fn new(check: impl Fn(&FieldValue) -> ValidationResult + Send + Sync + 'static) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// Run the check against `value`.
    pub fn check(&self, value: &FieldValue) -> ValidationResult {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// Run `validators` in order and return the first failure.
///
/// Ordering decides which message surfaces when several validators would
/// fail.
pub fn validate(value: &FieldValue, validators: &[Validator]) -> ValidationResult {
    validators
        .iter()
        .map(|validator| validator.check(value))
        .find(|result| !result.is_valid())
        .unwrap_or(ValidationResult::Valid)
}

/// Form input keyed by field name.
pub type FormData = BTreeMap<String, FieldValue>;

/// First error message per failing field.
pub type FormErrors = BTreeMap<String, String>;

/// Ordered validator lists keyed by field name.
///
/// Registering the same field twice replaces the earlier list.
#[derive(Debug, Clone, Default)]
pub struct FormRules {
    fields: Vec<(String, Vec<Validator>)>,
}

impl FormRules {
    /// Empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the validators for `field`.
    pub fn field(mut self, field: impl Into<String>, validators: Vec<Validator>) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = validators,
            None => self.fields.push((field, validators)),
        }
        self
    }

    /// Keep only the fields for which `keep` returns true.
    pub fn retain_fields(mut self, keep: impl Fn(&str) -> bool) -> Self {
        self.fields.retain(|(name, _)| keep(name));
        self
    }

    /// Iterate over registered field names in registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Whether no field is registered.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Validate every ruled field of `data`.
///
/// Fields with no entry in `data` are checked as [`FieldValue::Missing`].
/// Passing fields are omitted from the result, so an empty map means the
/// form is valid.
pub fn validate_form(data: &FormData, rules: &FormRules) -> FormErrors {
    let missing = FieldValue::Missing;
    rules
        .fields
        .iter()
        .filter_map(|(field, validators)| {
            let value = data.get(field).unwrap_or(&missing);
            match validate(value, validators) {
                ValidationResult::Valid => None,
                ValidationResult::Invalid { message } => Some((field.clone(), message)),
            }
        })
        .collect()
}
