//! Client-side customer collection kept in sync with the customer API.
//!
//! The store owns the canonical list, the "current customer" slot, the search
//! and status filter inputs, a loading counter and a single last-error
//! message. Filtered views, pages and dashboard figures are computed on every
//! read. Remote failures are caught here and retained as messages; callers
//! get `bool`/`Option` outcomes rather than errors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tracing::{debug, warn};

use super::customer::{Customer, CustomerDraft, CustomerId};
use super::customer_query::{PageRequest, Paginated, StatusFilter, filter_customers, paginate};
use super::dashboard::{DashboardStats, dashboard_stats};
use super::ports::{CustomerApi, RemoteApiError};

#[derive(Debug, Default)]
struct CollectionState {
    customers: Vec<Customer>,
    current: Option<Customer>,
    error: Option<String>,
    search: String,
    status: StatusFilter,
}

/// Raises the loading counter for as long as it lives.
pub(crate) struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    pub(crate) fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Customer collection state.
pub struct CustomerStore {
    api: Arc<dyn CustomerApi>,
    clock: Arc<dyn Clock>,
    state: Mutex<CollectionState>,
    in_flight: AtomicUsize,
}

impl CustomerStore {
    /// Create an empty store backed by `api`.
    pub fn new(api: Arc<dyn CustomerApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            state: Mutex::new(CollectionState::default()),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> LoadingGuard<'_> {
        let guard = LoadingGuard::new(&self.in_flight);
        self.state().error = None;
        guard
    }

    fn fail(&self, action: &str, err: &RemoteApiError) {
        warn!(action, error = %err, "customer request failed");
        self.state().error = Some(format!("{action}: {err}"));
    }

    /// Replace the collection with the remote list.
    ///
    /// Returns whether the fetch succeeded; on failure the collection is
    /// left as it was.
    pub async fn fetch_all(&self) -> bool {
        let _loading = self.begin();
        match self.api.list().await {
            Ok(customers) => {
                debug!(count = customers.len(), "customers fetched");
                self.state().customers = customers;
                true
            }
            Err(err) => {
                self.fail("Failed to fetch customers", &err);
                false
            }
        }
    }

    /// Load one customer into the current slot.
    pub async fn fetch_by_id(&self, id: &CustomerId) -> bool {
        let _loading = self.begin();
        match self.api.get(id).await {
            Ok(customer) => {
                self.state().current = Some(customer);
                true
            }
            Err(err) => {
                self.fail("Failed to fetch customer", &err);
                false
            }
        }
    }

    /// Create a customer and append the stored record.
    pub async fn create(&self, draft: &CustomerDraft) -> Option<Customer> {
        let _loading = self.begin();
        match self.api.create(draft).await {
            Ok(customer) => {
                debug!(id = %customer.id(), "customer created");
                self.state().customers.push(customer.clone());
                Some(customer)
            }
            Err(err) => {
                self.fail("Failed to create customer", &err);
                None
            }
        }
    }

    /// Apply `draft` to a known customer.
    ///
    /// Ids held neither in the collection nor in the current slot are
    /// refused locally. On success the record is replaced in place, keeping
    /// its position, and the current slot follows when it holds the same id.
    ///
    /// An id absent from the collection still counts as known while it sits
    /// in the current slot, so a record opened with
    /// [`fetch_by_id`](Self::fetch_by_id) can be edited without listing
    /// first. Only the slot is refreshed in that case; the collection gains
    /// nothing.
    pub async fn update(&self, id: &CustomerId, draft: &CustomerDraft) -> bool {
        if !self.is_known(id) {
            debug!(%id, "update skipped for unknown customer");
            return false;
        }

        let _loading = self.begin();
        let updated = match self.api.update(id, draft).await {
            Ok(updated) => updated,
            Err(err) => {
                self.fail("Failed to update customer", &err);
                return false;
            }
        };
        if updated.id() != id {
            let err = RemoteApiError::decode(format!(
                "expected customer {id}, received {}",
                updated.id()
            ));
            self.fail("Failed to update customer", &err);
            return false;
        }

        let mut state = self.state();
        if let Some(slot) = state.customers.iter_mut().find(|c| c.id() == id) {
            *slot = updated.clone();
        }
        if state.current.as_ref().is_some_and(|c| c.id() == id) {
            state.current = Some(updated);
        }
        true
    }

    fn is_known(&self, id: &CustomerId) -> bool {
        let state = self.state();
        state.customers.iter().any(|c| c.id() == id)
            || state.current.as_ref().is_some_and(|c| c.id() == id)
    }

    /// Delete a customer remotely, then drop it locally.
    pub async fn delete(&self, id: &CustomerId) -> bool {
        let _loading = self.begin();
        if let Err(err) = self.api.delete(id).await {
            self.fail("Failed to delete customer", &err);
            return false;
        }

        let mut state = self.state();
        state.customers.retain(|c| c.id() != id);
        if state.current.as_ref().is_some_and(|c| c.id() == id) {
            state.current = None;
        }
        debug!(%id, "customer deleted");
        true
    }

    /// Set the free-text search.
    pub fn set_search_query(&self, query: impl Into<String>) {
        self.state().search = query.into();
    }

    /// Set the status filter.
    pub fn set_status_filter(&self, status: StatusFilter) {
        self.state().status = status;
    }

    /// Current free-text search.
    pub fn search_query(&self) -> String {
        self.state().search.clone()
    }

    /// Current status filter.
    pub fn status_filter(&self) -> StatusFilter {
        self.state().status
    }

    /// Snapshot of the collection in arrival order.
    pub fn customers(&self) -> Vec<Customer> {
        self.state().customers.clone()
    }

    /// Customer in the current slot.
    pub fn current_customer(&self) -> Option<Customer> {
        self.state().current.clone()
    }

    /// Whether any operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Message left by the most recent failed operation.
    pub fn last_error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Collection narrowed by the search and status filter.
    pub fn filtered_customers(&self) -> Vec<Customer> {
        let state = self.state();
        filter_customers(&state.customers, &state.search, state.status)
    }

    /// Sorted page of the filtered view.
    pub fn page(&self, request: &PageRequest) -> Paginated<Customer> {
        paginate(self.filtered_customers(), request)
    }

    /// Dashboard figures over the whole collection.
    pub fn dashboard_stats(&self) -> DashboardStats {
        dashboard_stats(&self.state().customers, self.clock.utc())
    }
}

#[cfg(test)]
#[path = "customer_store_tests.rs"]
mod tests;
