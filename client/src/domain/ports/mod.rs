//! Ports at the boundary between client state and the outside world.

mod macros;
pub(crate) use macros::define_port_error;

mod analytics_api;
mod auth_api;
mod customer_api;
mod expiry_scheduler;
mod remote_api_error;
mod token_store;

#[cfg(test)]
pub use analytics_api::MockAnalyticsApi;
pub use analytics_api::{
    AnalyticsApi, AnalyticsSummary, ChartPoint, DEFAULT_GROWTH_MONTHS, FunnelStage, RevenuePeriod,
};
#[cfg(test)]
pub use auth_api::MockAuthApi;
pub use auth_api::AuthApi;
#[cfg(test)]
pub use customer_api::MockCustomerApi;
pub use customer_api::CustomerApi;
pub use expiry_scheduler::{ExpiryScheduler, ExpiryTask};
pub use remote_api_error::RemoteApiError;
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{InMemoryTokenStore, TokenSlot, TokenStore, TokenStoreError};
