//! Demo-mode decorator that answers customer reads from seed data.
//!
//! When the wrapped API fails, list reads return the bundled sample customers
//! and get-by-id reads return the matching sample or a not-found error.
//! Writes always pass straight through. Callers cannot tell fallback data
//! from live data; every fallback is logged at warn level.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sample_data::{SampleCustomer, find_sample_customer, sample_customers};
use tracing::warn;

use crate::domain::ports::{CustomerApi, RemoteApiError};
use crate::domain::{
    Customer, CustomerDraft, CustomerId, CustomerStatus, CustomerValidationError,
};

/// [`CustomerApi`] decorator with sample-data fallback for reads.
pub struct SampleFallbackCustomerApi<A> {
    inner: A,
}

impl<A> SampleFallbackCustomerApi<A> {
    /// Wrap `inner`.
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A> CustomerApi for SampleFallbackCustomerApi<A>
where
    A: CustomerApi,
{
    async fn list(&self) -> Result<Vec<Customer>, RemoteApiError> {
        match self.inner.list().await {
            Ok(customers) => Ok(customers),
            Err(err) => {
                warn!(error = %err, "customer list unavailable; serving sample customers");
                let samples = sample_customers().map_err(|e| RemoteApiError::decode(e.to_string()))?;
                samples.into_iter().map(into_customer).collect()
            }
        }
    }

    async fn get(&self, id: &CustomerId) -> Result<Customer, RemoteApiError> {
        match self.inner.get(id).await {
            Ok(customer) => Ok(customer),
            Err(err) => {
                warn!(%id, error = %err, "customer lookup unavailable; serving sample customer");
                find_sample_customer(id.as_str())
                    .map_err(|e| RemoteApiError::decode(e.to_string()))?
                    .map(into_customer)
                    .unwrap_or_else(|| Err(RemoteApiError::not_found(format!("customer {id}"))))
            }
        }
    }

    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, RemoteApiError> {
        self.inner.create(draft).await
    }

    async fn update(
        &self,
        id: &CustomerId,
        draft: &CustomerDraft,
    ) -> Result<Customer, RemoteApiError> {
        self.inner.update(id, draft).await
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), RemoteApiError> {
        self.inner.delete(id).await
    }
}

fn into_customer(sample: SampleCustomer) -> Result<Customer, RemoteApiError> {
    let invalid = |what: &str, detail: String| {
        RemoteApiError::decode(format!("sample customer {}: invalid {what}: {detail}", sample.id))
    };
    let status: CustomerStatus = sample
        .status
        .parse()
        .map_err(|e: CustomerValidationError| invalid("status", e.to_string()))?;
    let created_at = parse_timestamp(&sample.created_at).map_err(|e| invalid("createdAt", e))?;
    let updated_at = parse_timestamp(&sample.updated_at).map_err(|e| invalid("updatedAt", e))?;

    let mut builder = Customer::builder(
        sample.id.clone(),
        sample.name.clone(),
        sample.email.clone(),
        sample.company.clone(),
    )
    .status(status)
    .total_spent(sample.total_spent)
    .created_at(created_at)
    .updated_at(updated_at);
    if let Some(phone) = &sample.phone {
        builder = builder.phone(phone.clone());
    }
    if let Some(address) = &sample.address {
        builder = builder.address(address.clone());
    }
    if let Some(notes) = &sample.notes {
        builder = builder.notes(notes.clone());
    }
    builder.build().map_err(|e| invalid("record", e.to_string()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockCustomerApi;
    use rstest::rstest;

    fn offline() -> MockCustomerApi {
        let mut api = MockCustomerApi::new();
        api.expect_list()
            .returning(|| Err(RemoteApiError::transport("connection refused")));
        api.expect_get()
            .returning(|_| Err(RemoteApiError::transport("connection refused")));
        api
    }

    fn id(raw: &str) -> CustomerId {
        CustomerId::new(raw).expect("valid id")
    }

    #[tokio::test]
    async fn list_failure_serves_the_five_samples() {
        let api = SampleFallbackCustomerApi::new(offline());
        let customers = api.list().await.expect("fallback list");
        let ids: Vec<_> = customers.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
        assert_eq!(customers[0].name(), "Alice Johnson");
        assert_eq!(customers[2].status(), CustomerStatus::Lead);
    }

    #[rstest]
    #[case("4", Some("David Kim"))]
    #[case("42", None)]
    #[tokio::test]
    async fn get_failure_serves_matching_sample_or_not_found(
        #[case] raw: &str,
        #[case] expected: Option<&str>,
    ) {
        let api = SampleFallbackCustomerApi::new(offline());
        let result = api.get(&id(raw)).await;
        match expected {
            Some(name) => assert_eq!(result.expect("sample").name(), name),
            None => assert!(matches!(result, Err(RemoteApiError::NotFound { .. }))),
        }
    }

    #[tokio::test]
    async fn live_results_pass_through() {
        let mut api = MockCustomerApi::new();
        api.expect_list().times(1).return_once(|| Ok(Vec::new()));
        let api = SampleFallbackCustomerApi::new(api);
        assert!(api.list().await.expect("live list").is_empty());
    }

    #[tokio::test]
    async fn writes_never_fall_back() {
        let mut api = MockCustomerApi::new();
        api.expect_create()
            .times(1)
            .return_once(|_| Err(RemoteApiError::transport("offline")));
        api.expect_delete()
            .times(1)
            .return_once(|_| Err(RemoteApiError::transport("offline")));
        let api = SampleFallbackCustomerApi::new(api);

        assert!(api.create(&CustomerDraft::default()).await.is_err());
        assert!(api.delete(&id("1")).await.is_err());
    }
}
