//! Demo performance source
//!
//! Generates plausible synthetic campaign data. Used when no Yandex.Direct
//! token is configured.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::domain::entities::{CampaignMetrics, DataOrigin, PerformanceReport, Trend};
use crate::domain::ports::PerformanceSource;
use crate::error::SourceError;

const DEMO_NOTE: &str =
    "DEMO DATA. A Yandex.Direct API token (YANDEX_API_TOKEN) is required for real data.";

const TRENDS: [Trend; 3] = [Trend::Improving, Trend::Stable, Trend::Worsening];

pub struct DemoSource {
    rng: Mutex<StdRng>,
}

impl DemoSource {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic source for reproducible output
    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate(&self, campaign_id: &str, days: u32) -> PerformanceReport {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let base_cost: f64 = rng.gen_range(30_000.0..80_000.0);
        let base_conversions: u64 = rng.gen_range(50..=200);
        let trend = *TRENDS.choose(&mut *rng).unwrap_or(&Trend::Stable);

        let (total_cost, total_conversions) = match trend {
            Trend::Improving => (base_cost * 0.85, (base_conversions as f64 * 1.15) as u64),
            Trend::Worsening => (base_cost * 1.3, (base_conversions as f64 * 0.7) as u64),
            Trend::Stable => (base_cost, base_conversions),
        };

        let total_clicks = (total_conversions as f64 * rng.gen_range(8.0..12.0)) as u64;
        let total_impressions = total_clicks * rng.gen_range(10..=15u64);

        PerformanceReport {
            campaign_id: campaign_id.to_string(),
            period_days: days,
            source: DataOrigin::DemoData,
            data_trend: trend,
            metrics: CampaignMetrics::from_totals(
                total_cost,
                total_conversions,
                total_clicks,
                total_impressions,
                days,
            ),
            period: None,
            note: Some(DEMO_NOTE.to_string()),
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PerformanceSource for DemoSource {
    async fn fetch(&self, campaign_id: &str, days: u32) -> Result<PerformanceReport, SourceError> {
        let report = self.generate(campaign_id, days);
        tracing::debug!(
            campaign_id,
            days,
            trend = ?report.data_trend,
            "Generated demo performance report"
        );
        Ok(report)
    }

    fn kind(&self) -> &'static str {
        DataOrigin::DemoData.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_report_stays_within_bounds() {
        let source = DemoSource::seeded(7);

        for _ in 0..200 {
            let report = source.fetch("12345", 7).await.unwrap();
            let m = &report.metrics;

            assert_eq!(report.campaign_id, "12345");
            assert_eq!(report.period_days, 7);
            assert_eq!(m.days_analyzed, 7);
            assert_eq!(report.source, DataOrigin::DemoData);

            // 30000 * 0.85 .. 80000 * 1.3
            assert!(m.total_cost >= 25_500.0 && m.total_cost <= 104_000.0);
            // floor(50 * 0.7) .. floor(200 * 1.15)
            assert!(m.total_conversions >= 35 && m.total_conversions <= 230);
            assert!(m.total_clicks >= m.total_conversions * 8);
            assert!(m.total_clicks <= m.total_conversions * 12);
            assert!(m.total_impressions >= m.total_clicks * 10);
            assert!(m.total_impressions <= m.total_clicks * 15);
            // impressions are 10-15x clicks
            assert!(m.avg_ctr >= 6.66 && m.avg_ctr <= 10.0);
        }
    }

    #[tokio::test]
    async fn test_same_seed_gives_same_report() {
        let a = DemoSource::seeded(42).fetch("1", 3).await.unwrap();
        let b = DemoSource::seeded(42).fetch("1", 3).await.unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.data_trend, b.data_trend);
    }

    #[tokio::test]
    async fn test_demo_report_is_marked_as_demo() {
        let report = DemoSource::new().fetch("1", 3).await.unwrap();
        assert!(report.note.unwrap().contains("DEMO DATA"));
        assert!(report.period.is_none());
    }

    #[tokio::test]
    async fn test_kind_matches_report_source() {
        let source = DemoSource::new();
        let report = source.fetch("1", 3).await.unwrap();
        assert_eq!(source.kind(), "demo_data");
        assert_eq!(serde_json::to_value(report.source).unwrap(), source.kind());
    }
}
