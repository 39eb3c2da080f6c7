//! [`AnalyticsApi`] over HTTP.

use async_trait::async_trait;

use super::ApiClient;
use crate::domain::ports::{
    AnalyticsApi, AnalyticsSummary, ChartPoint, FunnelStage, RemoteApiError, RevenuePeriod,
};

#[async_trait]
impl AnalyticsApi for ApiClient {
    async fn dashboard(&self) -> Result<AnalyticsSummary, RemoteApiError> {
        self.get_json(self.endpoint("analytics/dashboard")?).await
    }

    async fn revenue(&self, period: RevenuePeriod) -> Result<Vec<ChartPoint>, RemoteApiError> {
        let mut url = self.endpoint("analytics/revenue")?;
        url.query_pairs_mut().append_pair("period", period.as_str());
        self.get_json(url).await
    }

    async fn funnel(&self) -> Result<Vec<FunnelStage>, RemoteApiError> {
        self.get_json(self.endpoint("analytics/funnel")?).await
    }

    async fn customer_growth(&self, months: u32) -> Result<Vec<ChartPoint>, RemoteApiError> {
        let mut url = self.endpoint("analytics/customer-growth")?;
        url.query_pairs_mut()
            .append_pair("months", &months.to_string());
        self.get_json(url).await
    }
}
