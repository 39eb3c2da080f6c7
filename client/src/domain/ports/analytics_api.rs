//! Driven port for the read-only analytics endpoints.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::RemoteApiError;

/// Server-computed dashboard summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    /// Every customer on record.
    pub total_customers: u64,
    /// Deals currently open.
    pub active_deals: u64,
    /// Revenue for the current period.
    pub revenue: f64,
    /// Lead-to-customer conversion, in percent.
    pub conversion_rate: f64,
    /// Customers created this month.
    pub new_customers_this_month: u64,
    /// Revenue change against the previous period, in percent.
    pub revenue_growth: f64,
}

/// One labelled value in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Axis label.
    pub label: String,
    /// Plotted value.
    pub value: f64,
}

/// One stage of the sales funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    /// Stage name.
    pub stage: String,
    /// Deals in the stage.
    pub count: u64,
    /// Share of the top of the funnel, in percent.
    pub percentage: f64,
}

/// Bucket size for the revenue series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevenuePeriod {
    /// Daily points over a week.
    Week,
    /// Default bucket.
    #[default]
    Month,
    /// Quarterly buckets.
    Quarter,
    /// Yearly buckets.
    Year,
}

impl RevenuePeriod {
    /// Query-string value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for RevenuePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevenuePeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Week, Self::Month, Self::Quarter, Self::Year]
            .into_iter()
            .find(|period| period.as_str() == value)
            .ok_or_else(|| format!("unknown revenue period '{value}'"))
    }
}

/// Months covered by the growth series when the caller does not choose.
pub const DEFAULT_GROWTH_MONTHS: u32 = 12;

/// Remote analytics queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Headline figures.
    async fn dashboard(&self) -> Result<AnalyticsSummary, RemoteApiError>;

    /// Revenue series bucketed by `period`.
    async fn revenue(&self, period: RevenuePeriod) -> Result<Vec<ChartPoint>, RemoteApiError>;

    /// Sales funnel stages, top first.
    async fn funnel(&self) -> Result<Vec<FunnelStage>, RemoteApiError>;

    /// New customers per month over the last `months` months.
    async fn customer_growth(&self, months: u32) -> Result<Vec<ChartPoint>, RemoteApiError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_decodes_camel_case() {
        let summary: AnalyticsSummary = serde_json::from_value(json!({
            "totalCustomers": 120,
            "activeDeals": 14,
            "revenue": 98000.5,
            "conversionRate": 12.5,
            "newCustomersThisMonth": 9,
            "revenueGrowth": -3.2
        }))
        .expect("summary decodes");
        assert_eq!(summary.new_customers_this_month, 9);
        assert_eq!(summary.revenue_growth, -3.2);
    }

    #[test]
    fn revenue_period_round_trips_through_strings() {
        for period in [
            RevenuePeriod::Week,
            RevenuePeriod::Month,
            RevenuePeriod::Quarter,
            RevenuePeriod::Year,
        ] {
            assert_eq!(period.as_str().parse::<RevenuePeriod>(), Ok(period));
        }
        assert!("fortnight".parse::<RevenuePeriod>().is_err());
    }
}
