//! [`CustomerApi`] over HTTP.

use async_trait::async_trait;

use super::ApiClient;
use crate::domain::ports::{CustomerApi, RemoteApiError};
use crate::domain::{Customer, CustomerDraft, CustomerId};

const CUSTOMERS: &str = "customers";

#[async_trait]
impl CustomerApi for ApiClient {
    async fn list(&self) -> Result<Vec<Customer>, RemoteApiError> {
        self.get_json(self.endpoint(CUSTOMERS)?).await
    }

    async fn get(&self, id: &CustomerId) -> Result<Customer, RemoteApiError> {
        self.get_json(self.resource(CUSTOMERS, id.as_str())?).await
    }

    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, RemoteApiError> {
        self.post_json(self.endpoint(CUSTOMERS)?, draft).await
    }

    async fn update(
        &self,
        id: &CustomerId,
        draft: &CustomerDraft,
    ) -> Result<Customer, RemoteApiError> {
        self.put_json(self.resource(CUSTOMERS, id.as_str())?, draft)
            .await
    }

    async fn delete(&self, id: &CustomerId) -> Result<(), RemoteApiError> {
        self.delete_resource(self.resource(CUSTOMERS, id.as_str())?)
            .await
    }
}
