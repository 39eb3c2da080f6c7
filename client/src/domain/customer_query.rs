//! Derived customer views: filtering, sorting and pagination.
//!
//! Everything here is a pure function over a customer slice; the store calls
//! these on every read so views never go stale.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::customer::{Customer, CustomerStatus, CustomerValidationError};

/// Status restriction applied to the customer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// No restriction.
    #[default]
    All,
    /// Only customers with this status.
    Only(CustomerStatus),
}

impl StatusFilter {
    /// Whether `status` passes the filter.
    pub fn matches(self, status: CustomerStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CustomerValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value == "all" {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

impl From<CustomerStatus> for StatusFilter {
    fn from(value: CustomerStatus) -> Self {
        Self::Only(value)
    }
}

/// Customers matching `search` and `status`, in their original order.
///
/// The search is a case-insensitive substring match over name, email and
/// company; an empty search matches everyone.
pub fn filter_customers(customers: &[Customer], search: &str, status: StatusFilter) -> Vec<Customer> {
    let needle = search.to_lowercase();
    customers
        .iter()
        .filter(|customer| status.matches(customer.status()))
        .filter(|customer| needle.is_empty() || matches_search(customer, &needle))
        .cloned()
        .collect()
}

fn matches_search(customer: &Customer, needle: &str) -> bool {
    [customer.name(), customer.email(), customer.company()]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Sortable customer attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CustomerSort {
    /// Case-insensitive name order.
    Name,
    /// Creation time.
    CreatedAt,
    /// Lifetime spend.
    TotalSpent,
}

impl CustomerSort {
    fn compare(self, left: &Customer, right: &Customer) -> Ordering {
        match self {
            Self::Name => left.name().to_lowercase().cmp(&right.name().to_lowercase()),
            Self::CreatedAt => left.created_at().cmp(&right.created_at()),
            Self::TotalSpent => left.total_spent().total_cmp(&right.total_spent()),
        }
    }
}

impl FromStr for CustomerSort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "createdAt" | "created-at" => Ok(Self::CreatedAt),
            "totalSpent" | "total-spent" => Ok(Self::TotalSpent),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// Page size used when the caller does not pick one.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Sorting and paging options for a customer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Sort key; `None` keeps arrival order.
    pub sort_by: Option<CustomerSort>,
    /// Direction applied to `sort_by`.
    pub order: SortOrder,
    /// 1-based page number. Zero is read as the first page.
    pub page: usize,
    /// Items per page. Zero is read as one.
    pub per_page: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            sort_by: None,
            order: SortOrder::Asc,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of a larger result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Items across all pages.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Number of pages; zero when there are no items.
    pub total_pages: usize,
}

/// Sort `customers` and cut out the requested page.
///
/// Sorting is stable, so ties keep their arrival order in both directions.
pub fn paginate(mut customers: Vec<Customer>, request: &PageRequest) -> Paginated<Customer> {
    if let Some(sort) = request.sort_by {
        customers.sort_by(|left, right| {
            let ordering = sort.compare(left, right);
            match request.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    let per_page = request.per_page.max(1);
    let page = request.page.max(1);
    let total = customers.len();
    let total_pages = total.div_ceil(per_page);
    let items = customers
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    Paginated {
        items,
        total,
        page,
        per_page,
        total_pages,
    }
}
