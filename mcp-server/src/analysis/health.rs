//! Campaign health rules
//!
//! Compares actual campaign metrics with the target CPA and daily budget
//! limit and produces issues, alerts and recommendations.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::entities::CampaignMetrics;
use crate::error::ToolError;

/// CPA above `target * CPA_CRITICAL_RATIO` means the campaign should be stopped
pub const CPA_CRITICAL_RATIO: f64 = 1.5;

/// CPA above `target * CPA_HIGH_RATIO` needs bid optimisation
pub const CPA_HIGH_RATIO: f64 = 1.2;

/// Clicks without a single conversion before the landing page is suspected
pub const NO_CONVERSION_CLICKS: u64 = 50;

/// CTR (percent) treated as good traffic attraction
pub const GOOD_CTR_PERCENT: f64 = 5.0;

/// Conversion rate below which good CTR is considered irrelevant traffic
pub const LOW_CONVERSION_RATE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthIssue {
    CpaCritical,
    CpaHigh,
    BudgetOverspend,
    NoConversions,
    HighCtrLowConv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    NeedsAttention,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            HealthStatus::Healthy
        } else if score >= 50 {
            HealthStatus::NeedsAttention
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::NeedsAttention => "needs_attention",
            HealthStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthTargets {
    pub target_cpa: f64,
    pub daily_budget_limit: f64,
}

impl HealthTargets {
    pub fn new(target_cpa: f64, daily_budget_limit: f64) -> Result<Self, ToolError> {
        if !(target_cpa.is_finite() && target_cpa > 0.0) {
            return Err(ToolError::Validation(
                "target_cpa must be a positive number".to_string(),
            ));
        }
        if !(daily_budget_limit.is_finite() && daily_budget_limit > 0.0) {
            return Err(ToolError::Validation(
                "daily_budget_limit must be a positive number".to_string(),
            ));
        }
        Ok(Self {
            target_cpa,
            daily_budget_limit,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthAnalysis {
    pub campaign_id: String,
    pub analysis_date: String,
    pub health_score: u8,
    pub status: HealthStatus,
    pub metrics: CampaignMetrics,
    pub targets: HealthTargets,
    pub issues: Vec<HealthIssue>,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
    pub action_required: bool,
    pub summary: String,
}

#[cfg(test)]
impl HealthAnalysis {
    pub fn has_issue(&self, issue: HealthIssue) -> bool {
        self.issues.contains(&issue)
    }
}

/// Apply the health rules to a campaign's metrics
pub fn analyze(
    campaign_id: &str,
    metrics: &CampaignMetrics,
    targets: HealthTargets,
    now: DateTime<Local>,
) -> HealthAnalysis {
    let mut issues = Vec::new();
    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    let actual_cpa = metrics.avg_cpa;
    let target_cpa = targets.target_cpa;

    // CPA against target
    if actual_cpa > target_cpa * CPA_CRITICAL_RATIO {
        issues.push(HealthIssue::CpaCritical);
        alerts.push(format!(
            "🚨 CPA {} RUB exceeds the target {} RUB by {:.0}%",
            actual_cpa,
            target_cpa,
            (actual_cpa / target_cpa - 1.0) * 100.0
        ));
        recommendations.push("STOP THE CAMPAIGN IMMEDIATELY".to_string());
        recommendations.push("Revisit creatives and keywords".to_string());
    } else if actual_cpa > target_cpa * CPA_HIGH_RATIO {
        issues.push(HealthIssue::CpaHigh);
        alerts.push(format!(
            "⚠️ CPA {} RUB is above the target {} RUB",
            actual_cpa, target_cpa
        ));
        recommendations.push("Lower bids by 20-30%".to_string());
        recommendations.push("Add negative keywords".to_string());
    }

    // Budget overspend
    let avg_daily_cost = metrics.avg_daily_cost();
    if avg_daily_cost > targets.daily_budget_limit {
        issues.push(HealthIssue::BudgetOverspend);
        alerts.push(format!(
            "⚠️ Average daily spend {:.0} RUB exceeds the limit {} RUB",
            avg_daily_cost, targets.daily_budget_limit
        ));
        recommendations.push(format!(
            "Set a daily limit of {} RUB",
            targets.daily_budget_limit
        ));
    }

    // Traffic without conversions
    if metrics.total_clicks > NO_CONVERSION_CLICKS && metrics.total_conversions == 0 {
        issues.push(HealthIssue::NoConversions);
        alerts.push(format!(
            "⚠️ {} clicks, 0 conversions",
            metrics.total_clicks
        ));
        recommendations.push("Check the landing page and conversion goals".to_string());
    }

    // Good CTR, poor conversion
    if metrics.avg_ctr > GOOD_CTR_PERCENT
        && metrics.total_clicks > 0
        && metrics.conversion_rate() < LOW_CONVERSION_RATE
    {
        issues.push(HealthIssue::HighCtrLowConv);
        alerts.push(format!(
            "⚠️ CTR is good ({:.1}%), but conversion is low",
            metrics.avg_ctr
        ));
        recommendations.push("Refine targeting, the traffic may be irrelevant".to_string());
    }

    let health_score = score(&issues);
    let action_required = issues.contains(&HealthIssue::CpaCritical);

    let verdict = if action_required {
        "requires stopping"
    } else if !issues.is_empty() {
        "requires optimization"
    } else {
        "running stable"
    };

    HealthAnalysis {
        campaign_id: campaign_id.to_string(),
        analysis_date: now.to_rfc3339(),
        health_score,
        status: HealthStatus::from_score(health_score),
        metrics: metrics.clone(),
        targets,
        issues,
        alerts,
        recommendations,
        action_required,
        summary: format!("Campaign {}: {}", campaign_id, verdict),
    }
}

fn score(issues: &[HealthIssue]) -> u8 {
    if issues.contains(&HealthIssue::CpaCritical) {
        20
    } else if issues.contains(&HealthIssue::CpaHigh) {
        50
    } else if !issues.is_empty() {
        70
    } else {
        100
    }
}
