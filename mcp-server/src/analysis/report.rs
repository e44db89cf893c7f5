//! Daily report renderer
//!
//! Renders health analyses of several campaigns to LLM-readable text.

use chrono::{DateTime, Local};

use super::health::{HealthAnalysis, HealthStatus};

/// Target CPA used for every campaign in the daily report
pub const REPORT_TARGET_CPA: f64 = 150.0;

/// Daily budget limit used for every campaign in the daily report
pub const REPORT_DAILY_BUDGET_LIMIT: f64 = 1000.0;

/// Alerts shown per campaign
const MAX_ALERTS: usize = 2;

/// Outcome of analysing one campaign for the report
#[derive(Debug, Clone)]
pub enum CampaignEntry {
    Analyzed(HealthAnalysis),
    Failed { campaign_id: String, error: String },
}

pub fn render_daily_report(entries: &[CampaignEntry], now: DateTime<Local>) -> String {
    let mut lines = vec![
        "📊 CAMPAIGN SUMMARY REPORT".to_string(),
        format!("Date: {}", now.format("%d.%m.%Y %H:%M")),
        format!("Campaigns analyzed: {}", entries.len()),
        String::new(),
    ];

    let mut critical_count = 0;
    for entry in entries {
        match entry {
            CampaignEntry::Analyzed(analysis) => {
                lines.extend(render_analysis(analysis));
                if analysis.action_required {
                    critical_count += 1;
                }
            }
            CampaignEntry::Failed { campaign_id, error } => {
                lines.push(format!("⚪ Campaign {}:", campaign_id));
                lines.push(format!("   Analysis failed: {}", error));
            }
        }
        lines.push(String::new());
    }

    if critical_count > 0 {
        lines.push(format!(
            "🚨 ATTENTION: {} campaigns need to be stopped immediately!",
            critical_count
        ));
    }

    lines.join("\n")
}

fn render_analysis(analysis: &HealthAnalysis) -> Vec<String> {
    let icon = match analysis.status {
        HealthStatus::Critical => "🔴",
        HealthStatus::NeedsAttention => "🟡",
        HealthStatus::Healthy => "🟢",
    };

    let mut lines = vec![
        format!("{} Campaign {}:", icon, analysis.campaign_id),
        format!(
            "   CPA: {} RUB (target: {} RUB)",
            analysis.metrics.avg_cpa, analysis.targets.target_cpa
        ),
        format!("   Conversions: {}", analysis.metrics.total_conversions),
        format!("   Status: {}", analysis.status.as_str().to_uppercase()),
    ];

    if !analysis.alerts.is_empty() {
        lines.push("   ⚠️ Alerts:".to_string());
        for alert in analysis.alerts.iter().take(MAX_ALERTS) {
            lines.push(format!("      • {}", alert));
        }
    }

    if analysis.action_required {
        lines.push("   🚨 INTERVENTION REQUIRED!".to_string());
    }

    lines
}
