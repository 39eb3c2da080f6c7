//! Built-in validators.

use std::sync::OnceLock;

use regex::Regex;

use super::{FieldValue, ValidationResult, Validator};

/// Label used by length and presence checks when the caller has none.
pub const DEFAULT_FIELD_NAME: &str = "Field";
/// Label used by numeric checks when the caller has none.
pub const DEFAULT_VALUE_NAME: &str = "Value";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        // Digits, whitespace, parentheses and dashes after an optional `+`.
        Regex::new(r"^\+?[0-9\s()\-]{7,15}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Fails on missing values, empty text and empty lists.
pub fn required(field_name: impl Into<String>) -> Validator {
    let field_name = field_name.into();
    Validator::new(move |value| {
        if value.is_empty_input() {
            ValidationResult::invalid(format!("{field_name} is required"))
        } else {
            ValidationResult::Valid
        }
    })
}

/// Fails on text shorter than `min` characters. Non-text values pass.
pub fn min_length(min: usize, field_name: impl Into<String>) -> Validator {
    let field_name = field_name.into();
    Validator::new(move |value| match value.as_text() {
        Some(text) if text.chars().count() < min => ValidationResult::invalid(format!(
            "{field_name} must be at least {min} characters"
        )),
        _ => ValidationResult::Valid,
    })
}

/// Fails on text longer than `max` characters. Non-text values pass.
pub fn max_length(max: usize, field_name: impl Into<String>) -> Validator {
    let field_name = field_name.into();
    Validator::new(move |value| match value.as_text() {
        Some(text) if text.chars().count() > max => ValidationResult::invalid(format!(
            "{field_name} must not exceed {max} characters"
        )),
        _ => ValidationResult::Valid,
    })
}

/// Fails on text that is not a plausible email address.
///
/// Empty text fails too; pair with [`required`] to control which message
/// surfaces first. Non-text values pass.
pub fn email() -> Validator {
    Validator::new(|value| match value.as_text() {
        Some(text) if !email_regex().is_match(text) => {
            ValidationResult::invalid("Please enter a valid email address")
        }
        _ => ValidationResult::Valid,
    })
}

/// Fails on non-empty text that is not 7 to 15 phone characters.
///
/// Empty text passes so optional phone fields need no extra rule.
pub fn phone() -> Validator {
    Validator::new(|value| match value.as_text() {
        Some(text) if !text.is_empty() && !phone_regex().is_match(text) => {
            ValidationResult::invalid("Please enter a valid phone number")
        }
        _ => ValidationResult::Valid,
    })
}

/// Fails when the value has no numeric reading or lies outside `min..=max`.
///
/// See [`FieldValue::as_number`] for the coercion rules.
pub fn numeric_range(min: f64, max: f64, field_name: impl Into<String>) -> Validator {
    let field_name = field_name.into();
    Validator::new(move |value: &FieldValue| match value.as_number() {
        Some(number) if (min..=max).contains(&number) => ValidationResult::Valid,
        _ => ValidationResult::invalid(format!("{field_name} must be between {min} and {max}")),
    })
}

/// Runs `inner` only when a value was supplied; [`FieldValue::Missing`] passes.
pub fn optional(inner: Validator) -> Validator {
    Validator::new(move |value| match value {
        FieldValue::Missing => ValidationResult::Valid,
        present => inner.check(present),
    })
}
