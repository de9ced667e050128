//! Data source seam for the report pipeline

use async_trait::async_trait;
use crate::clients::MarketLensClient;
use crate::error::Result;
use serde_json::Value;

/// Where cached report data comes from.
///
/// Implemented by the Market Lens client; tests substitute an in-memory
/// source.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Raw `{ "data": { "year", "quarter", "reports" } }` payload for a ticker
    async fn fetch_cached_report(
        &self,
        ticker: &str,
        year: Option<i64>,
        quarter: Option<i64>,
    ) -> Result<Value>;

    /// Raw `{ "data": [ {ticker, year, quarter}, ... ] }` payload
    async fn fetch_cached_periods(&self) -> Result<Value>;
}

#[async_trait]
impl ReportSource for MarketLensClient {
    async fn fetch_cached_report(
        &self,
        ticker: &str,
        year: Option<i64>,
        quarter: Option<i64>,
    ) -> Result<Value> {
        self.get_cached_report(ticker, year, quarter).await
    }

    async fn fetch_cached_periods(&self) -> Result<Value> {
        self.get_cached_periods().await
    }
}
