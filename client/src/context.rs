//! Application context: one owner for every store and port.
//!
//! Front ends construct a single [`AppContext`] per process and drive the
//! user-level actions through it. Each action runs the matching store
//! operation and turns the outcome into a notification.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use crate::config::{ClientSettings, ConfigError};
use crate::domain::ports::{
    AnalyticsApi, AnalyticsSummary, AuthApi, ChartPoint, CustomerApi, ExpiryScheduler,
    FunnelStage, RemoteApiError, RevenuePeriod, TokenStore, TokenStoreError,
};
use crate::domain::validation::{FormErrors, validate_form};
use crate::domain::{
    Customer, CustomerDraft, CustomerId, CustomerStore, Error, FetchUserOutcome,
    NotificationQueue, SessionStore, SessionUser, customer_form_rules,
};
use crate::outbound::http::ApiClient;
use crate::outbound::sample_fallback::SampleFallbackCustomerApi;
use crate::outbound::storage::FileTokenStore;

/// Failures while assembling the context from settings.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// A setting is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The token directory could not be opened.
    #[error(transparent)]
    Storage(#[from] TokenStoreError),
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outcome of a customer action that did not go through.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// The draft failed local validation; nothing was sent.
    #[error("form has {} invalid field(s)", .0.len())]
    Validation(FormErrors),
    /// The remote call failed.
    #[error("{message}")]
    Rejected {
        /// Message retained by the customer store.
        message: String,
    },
}

/// Port implementations the context is built from.
#[derive(Clone)]
pub struct AppPorts {
    pub auth: Arc<dyn AuthApi>,
    pub customers: Arc<dyn CustomerApi>,
    pub analytics: Arc<dyn AnalyticsApi>,
    pub tokens: Arc<dyn TokenStore>,
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn ExpiryScheduler>,
}

impl AppPorts {
    /// Production ports: HTTP adapters, file token storage and the system
    /// clock. Customer reads fall back to sample data when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] when a setting is invalid, the token
    /// directory cannot be opened or the HTTP client cannot be built.
    pub fn from_settings(
        settings: &ClientSettings,
        scheduler: Arc<dyn ExpiryScheduler>,
    ) -> Result<Self, ContextError> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::open(&settings.token_dir()?)?);
        let client = ApiClient::new(
            settings.api_base_url()?,
            settings.request_timeout()?,
            Arc::clone(&tokens),
        )?;
        let customers: Arc<dyn CustomerApi> = if settings.sample_fallback() {
            Arc::new(SampleFallbackCustomerApi::new(client.clone()))
        } else {
            Arc::new(client.clone())
        };
        let client = Arc::new(client);
        Ok(Self {
            auth: client.clone(),
            customers,
            analytics: client,
            tokens,
            clock: Arc::new(DefaultClock),
            scheduler,
        })
    }
}

/// Owner of the session, customer and notification state.
pub struct AppContext {
    session: SessionStore,
    customers: CustomerStore,
    notifications: NotificationQueue,
    analytics: Arc<dyn AnalyticsApi>,
}

impl From<AppPorts> for AppContext {
    fn from(ports: AppPorts) -> Self {
        Self::new(ports)
    }
}

impl AppContext {
    /// Build the stores over `ports`. The session is rehydrated from the
    /// token store immediately.
    pub fn new(ports: AppPorts) -> Self {
        let AppPorts {
            auth,
            customers,
            analytics,
            tokens,
            clock,
            scheduler,
        } = ports;
        Self {
            session: SessionStore::new(auth, tokens),
            customers: CustomerStore::new(customers, Arc::clone(&clock)),
            notifications: NotificationQueue::new(clock, scheduler),
            analytics,
        }
    }

    /// Build a context from loaded settings.
    ///
    /// # Errors
    ///
    /// See [`AppPorts::from_settings`].
    pub fn from_settings(
        settings: &ClientSettings,
        scheduler: Arc<dyn ExpiryScheduler>,
    ) -> Result<Self, ContextError> {
        AppPorts::from_settings(settings, scheduler).map(Self::new)
    }

    /// Session state.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Customer collection state.
    pub fn customers(&self) -> &CustomerStore {
        &self.customers
    }

    /// User-facing notifications.
    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Sign in and greet the user.
    ///
    /// # Errors
    ///
    /// Returns the session store's error after queueing a "Login failed"
    /// notification.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, Error> {
        match self.session.login(email, password).await {
            Ok(user) => {
                info!(user = %user.id, "signed in");
                self.notifications
                    .success("Welcome back", Some(format!("Signed in as {}", user.name)));
                Ok(user)
            }
            Err(err) => {
                self.notifications
                    .error("Login failed", Some(err.message().to_owned()));
                Err(err)
            }
        }
    }

    /// Sign out.
    pub async fn logout(&self) {
        self.session.logout().await;
        info!("signed out");
        self.notifications.info("Signed out", None);
    }

    /// Reload persisted tokens and confirm them against the server.
    pub async fn restore_session(&self) -> FetchUserOutcome {
        self.session.rehydrate();
        let outcome = self.session.fetch_user().await;
        if outcome == FetchUserOutcome::SessionInvalidated {
            warn!("stored session rejected");
            self.notifications
                .warning("Session expired", Some("Please sign in again".to_owned()));
        }
        outcome
    }

    /// Refresh the customer list. Returns whether the fetch succeeded.
    pub async fn load_customers(&self) -> bool {
        let loaded = self.customers.fetch_all().await;
        if !loaded {
            self.notifications
                .error("Could not load customers", self.customers.last_error());
        }
        loaded
    }

    /// Load one customer into the current slot.
    pub async fn load_customer(&self, id: &CustomerId) -> bool {
        let loaded = self.customers.fetch_by_id(id).await;
        if !loaded {
            self.notifications
                .error("Could not load customer", self.customers.last_error());
        }
        loaded
    }

    /// Validate and create a customer.
    ///
    /// # Errors
    ///
    /// [`ActionError::Validation`] when the draft fails the customer form
    /// rules, [`ActionError::Rejected`] when the server refuses it.
    pub async fn create_customer(&self, draft: &CustomerDraft) -> Result<Customer, ActionError> {
        self.check_draft(draft, false)?;
        match self.customers.create(draft).await {
            Some(customer) => {
                self.notifications
                    .success("Customer created", Some(customer.name().to_owned()));
                Ok(customer)
            }
            None => Err(self.rejected("Could not create customer")),
        }
    }

    /// Validate the fields present in `draft` and apply them.
    ///
    /// # Errors
    ///
    /// As for [`Self::create_customer`]. Unknown ids are rejected without a
    /// remote call.
    pub async fn update_customer(
        &self,
        id: &CustomerId,
        draft: &CustomerDraft,
    ) -> Result<(), ActionError> {
        self.check_draft(draft, true)?;
        if self.customers.update(id, draft).await {
            self.notifications.success("Customer updated", None);
            Ok(())
        } else {
            Err(self.rejected("Could not update customer"))
        }
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// [`ActionError::Rejected`] when the server refuses the delete.
    pub async fn delete_customer(&self, id: &CustomerId) -> Result<(), ActionError> {
        if self.customers.delete(id).await {
            self.notifications.success("Customer deleted", None);
            Ok(())
        } else {
            Err(self.rejected("Could not delete customer"))
        }
    }

    /// Remote dashboard summary.
    ///
    /// # Errors
    ///
    /// Propagates the analytics API failure.
    pub async fn analytics_summary(&self) -> Result<AnalyticsSummary, RemoteApiError> {
        self.analytics.dashboard().await
    }

    /// Revenue series for `period`.
    ///
    /// # Errors
    ///
    /// Propagates the analytics API failure.
    pub async fn revenue(&self, period: RevenuePeriod) -> Result<Vec<ChartPoint>, RemoteApiError> {
        self.analytics.revenue(period).await
    }

    /// Sales funnel.
    ///
    /// # Errors
    ///
    /// Propagates the analytics API failure.
    pub async fn funnel(&self) -> Result<Vec<FunnelStage>, RemoteApiError> {
        self.analytics.funnel().await
    }

    /// Monthly customer growth over `months` months.
    ///
    /// # Errors
    ///
    /// Propagates the analytics API failure.
    pub async fn customer_growth(&self, months: u32) -> Result<Vec<ChartPoint>, RemoteApiError> {
        self.analytics.customer_growth(months).await
    }

    fn check_draft(&self, draft: &CustomerDraft, partial: bool) -> Result<(), ActionError> {
        let data = draft.form_data();
        let mut rules = customer_form_rules();
        if partial {
            rules = rules.retain_fields(|field| data.contains_key(field));
        }
        let errors = validate_form(&data, &rules);
        if errors.is_empty() {
            return Ok(());
        }
        let summary = errors.values().cloned().collect::<Vec<_>>().join("; ");
        self.notifications
            .warning("Please correct the form", Some(summary));
        Err(ActionError::Validation(errors))
    }

    fn rejected(&self, title: &str) -> ActionError {
        let message = self
            .customers
            .last_error()
            .unwrap_or_else(|| title.to_owned());
        self.notifications.error(title, Some(message.clone()));
        ActionError::Rejected { message }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
