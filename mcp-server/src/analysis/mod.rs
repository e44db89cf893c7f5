//! Analysis layer
//!
//! Business rules applied to campaign metrics. Everything here is pure:
//! data is fetched by the server and passed in.

pub mod cpa;
pub mod health;
pub mod report;
pub mod scenarios;

pub use health::{analyze, HealthAnalysis, HealthTargets};
pub use report::{
    render_daily_report, CampaignEntry, REPORT_DAILY_BUDGET_LIMIT, REPORT_TARGET_CPA,
};
