//! Performance source port trait
//!
//! Defines how tools obtain campaign performance reports.

use async_trait::async_trait;

use crate::domain::entities::PerformanceReport;
use crate::error::SourceError;

#[async_trait]
pub trait PerformanceSource: Send + Sync {
    /// Fetch aggregated performance for `campaign_id` over the last `days` days
    async fn fetch(&self, campaign_id: &str, days: u32) -> Result<PerformanceReport, SourceError>;

    /// Short name of the source, reported by `test_connection`
    fn kind(&self) -> &'static str;
}
