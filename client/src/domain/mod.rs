//! Client-side domain: entities, validation, state stores and ports.
//!
//! Purpose: hold the CRM client's canonical state and the rules that govern
//! it, independent of HTTP and storage. Outbound adapters implement the traits
//! in [`ports`]; the stores depend only on those traits.
//!
//! Public surface:
//! - [`Customer`], [`CustomerDraft`] and the derived query helpers.
//! - [`SessionStore`], [`CustomerStore`] and [`NotificationQueue`].
//! - [`validation`] for composable field and form checks.
//! - [`Error`] and [`ErrorCode`] for failures handed to callers.

pub mod auth;
pub mod customer;
pub mod customer_query;
pub mod customer_store;
pub mod dashboard;
pub mod error;
pub mod notifications;
pub mod ports;
pub mod session;
pub mod session_store;
pub mod validation;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::customer::{
    Customer, CustomerBuilder, CustomerDraft, CustomerId, CustomerStatus, CustomerValidationError,
    MAX_TOTAL_SPENT, customer_form_rules,
};
pub use self::customer_query::{
    CustomerSort, DEFAULT_PER_PAGE, PageRequest, Paginated, SortOrder, StatusFilter,
    filter_customers, paginate,
};
pub use self::customer_store::CustomerStore;
pub use self::dashboard::{DashboardStats, dashboard_stats};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notifications::{Notification, NotificationId, NotificationQueue, Severity};
pub use self::session::{
    ADMIN_ROLE, AccessToken, FetchUserOutcome, GUEST_NAME, LoginResponse, SessionPhase,
    SessionUser,
};
pub use self::session_store::SessionStore;
