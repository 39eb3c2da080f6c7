//! Driven port for customer CRUD.

use async_trait::async_trait;

use super::RemoteApiError;
use crate::domain::{Customer, CustomerDraft, CustomerId};

/// Remote customer collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerApi: Send + Sync {
    /// Every customer visible to the caller.
    async fn list(&self) -> Result<Vec<Customer>, RemoteApiError>;

    /// One customer by id.
    async fn get(&self, id: &CustomerId) -> Result<Customer, RemoteApiError>;

    /// Create a customer and return the stored record.
    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, RemoteApiError>;

    /// Apply `draft` to an existing customer and return the stored record.
    async fn update(
        &self,
        id: &CustomerId,
        draft: &CustomerDraft,
    ) -> Result<Customer, RemoteApiError>;

    /// Remove a customer.
    async fn delete(&self, id: &CustomerId) -> Result<(), RemoteApiError>;
}
