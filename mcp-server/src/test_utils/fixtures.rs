//! Test fixtures

use crate::domain::entities::{CampaignMetrics, DataOrigin, PerformanceReport, Trend};

/// Metrics from raw totals
pub fn metrics_with(
    cost: f64,
    conversions: u64,
    clicks: u64,
    impressions: u64,
    days: u32,
) -> CampaignMetrics {
    CampaignMetrics::from_totals(cost, conversions, clicks, impressions, days)
}

/// A stable demo report wrapping the given metrics
pub fn test_report(campaign_id: &str, metrics: CampaignMetrics) -> PerformanceReport {
    PerformanceReport {
        campaign_id: campaign_id.to_string(),
        period_days: metrics.days_analyzed,
        source: DataOrigin::DemoData,
        data_trend: Trend::Stable,
        metrics,
        period: None,
        note: None,
    }
}

/// Healthy campaign: CPA 100, 500 RUB/day, CTR 4%
pub fn healthy_metrics() -> CampaignMetrics {
    metrics_with(1500.0, 15, 300, 7500, 3)
}

/// Critical campaign: CPA 300 against a 150 target
pub fn critical_metrics() -> CampaignMetrics {
    metrics_with(30000.0, 100, 30000, 300000, 3)
}
