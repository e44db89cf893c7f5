//! Campaign performance entities

use serde::{Deserialize, Serialize};

/// Round to 2 decimal places (money and percentages)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Direction performance is heading over the report period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

/// Where a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    DemoData,
    YandexDirect,
}

impl DataOrigin {
    /// Same name as the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            DataOrigin::DemoData => "demo_data",
            DataOrigin::YandexDirect => "yandex_direct",
        }
    }
}

/// Aggregated metrics for one campaign over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub total_cost: f64,
    pub total_conversions: u64,
    pub total_clicks: u64,
    pub total_impressions: u64,
    pub avg_cpa: f64,
    /// Percent
    pub avg_ctr: f64,
    pub avg_cpc: f64,
    pub days_analyzed: u32,
}

impl CampaignMetrics {
    /// Build metrics from raw totals, deriving CPA, CTR and CPC.
    /// A zero denominator yields 0 for the derived value.
    pub fn from_totals(
        total_cost: f64,
        total_conversions: u64,
        total_clicks: u64,
        total_impressions: u64,
        days_analyzed: u32,
    ) -> Self {
        let avg_cpa = ratio(total_cost, total_conversions as f64);
        let avg_ctr = ratio(total_clicks as f64, total_impressions as f64) * 100.0;
        let avg_cpc = ratio(total_cost, total_clicks as f64);

        Self {
            total_cost: round2(total_cost),
            total_conversions,
            total_clicks,
            total_impressions,
            avg_cpa: round2(avg_cpa),
            avg_ctr: round2(avg_ctr),
            avg_cpc: round2(avg_cpc),
            days_analyzed,
        }
    }

    /// Average spend per analysed day
    pub fn avg_daily_cost(&self) -> f64 {
        ratio(self.total_cost, self.days_analyzed as f64)
    }

    /// Conversions per click, 0 without clicks
    pub fn conversion_rate(&self) -> f64 {
        ratio(self.total_conversions as f64, self.total_clicks as f64)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Performance report for a campaign, as returned by a `PerformanceSource`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub campaign_id: String,
    pub period_days: u32,
    pub source: DataOrigin,
    pub data_trend: Trend,
    pub metrics: CampaignMetrics,
    /// "YYYY-MM-DD - YYYY-MM-DD" for live reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
