//! Sample customer record shape and loaders.

use serde::Deserialize;

use crate::error::SampleDataError;

const SAMPLE_CUSTOMERS_JSON: &str = include_str!("../fixtures/sample_customers.json");

/// One sample customer exactly as stored in the fixture.
///
/// Field values are left as raw strings; consumers own status parsing and
/// timestamp validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SampleCustomer {
    /// Stable identifier.
    pub id: String,
    /// Contact name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Company name.
    pub company: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Lifecycle status (`active`, `inactive`, or `lead`).
    pub status: String,
    /// Lifetime spend.
    pub total_spent: f64,
    /// Optional postal address.
    pub address: Option<String>,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-update timestamp.
    pub updated_at: String,
}

/// Returns every sample customer in fixture order.
///
/// # Errors
///
/// Returns [`SampleDataError::Parse`] if the embedded fixture is malformed.
pub fn sample_customers() -> Result<Vec<SampleCustomer>, SampleDataError> {
    serde_json::from_str(SAMPLE_CUSTOMERS_JSON).map_err(|e| SampleDataError::Parse {
        message: e.to_string(),
    })
}

/// Looks up one sample customer by identifier.
///
/// # Errors
///
/// Returns [`SampleDataError::Parse`] if the embedded fixture is malformed.
pub fn find_sample_customer(id: &str) -> Result<Option<SampleCustomer>, SampleDataError> {
    Ok(sample_customers()?
        .into_iter()
        .find(|customer| customer.id == id))
}

#[cfg(test)]
mod tests {
    //! Covers fixture parsing and lookups.

    use rstest::rstest;

    use super::*;

    #[test]
    fn fixture_holds_five_customers_in_order() -> Result<(), SampleDataError> {
        let ids: Vec<String> = sample_customers()?.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
        Ok(())
    }

    #[test]
    fn fixture_spend_is_never_negative() -> Result<(), SampleDataError> {
        assert!(sample_customers()?.iter().all(|c| c.total_spent >= 0.0));
        Ok(())
    }

    #[rstest]
    #[case("1", Some("Alice Johnson"))]
    #[case("2", Some("Bob Martinez"))]
    #[case("5", Some("Emily Davis"))]
    #[case("9", None)]
    #[case("", None)]
    fn finds_customers_by_id(
        #[case] id: &str,
        #[case] expected: Option<&str>,
    ) -> Result<(), SampleDataError> {
        let found = find_sample_customer(id)?;
        assert_eq!(found.as_ref().map(|c| c.name.as_str()), expected);
        Ok(())
    }
}
