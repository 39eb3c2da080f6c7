//! Month-to-date dashboard aggregates computed from the local collection.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::customer::{Customer, CustomerStatus};

/// Aggregate figures shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Every customer in the collection.
    pub total_customers: usize,
    /// Customers with [`CustomerStatus::Active`].
    pub active_customers: usize,
    /// Sum of lifetime spend.
    pub total_revenue: f64,
    /// Customers created in the same UTC calendar month as `now`.
    pub new_this_month: usize,
}

/// Aggregate `customers` relative to `now`.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use crm_client::domain::dashboard_stats;
///
/// let stats = dashboard_stats(&[], Utc::now());
/// assert_eq!(stats.total_customers, 0);
/// assert_eq!(stats.total_revenue, 0.0);
/// ```
pub fn dashboard_stats(customers: &[Customer], now: DateTime<Utc>) -> DashboardStats {
    customers
        .iter()
        .fold(DashboardStats::default(), |mut stats, customer| {
            stats.total_customers += 1;
            if customer.status() == CustomerStatus::Active {
                stats.active_customers += 1;
            }
            stats.total_revenue += customer.total_spent();
            let created = customer.created_at();
            if created.year() == now.year() && created.month() == now.month() {
                stats.new_this_month += 1;
            }
            stats
        })
}
