//! Yandex.Direct Monitor MCP Server implementation
//!
//! Read-only: tools report on campaigns and recommend actions, they never
//! change campaign settings.

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{
    handler::server::tool::ToolRouter,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::adapters::{DemoSource, DirectClient};
use crate::analysis::{
    self, cpa, render_daily_report, scenarios, CampaignEntry, HealthAnalysis, HealthTargets,
    REPORT_DAILY_BUDGET_LIMIT, REPORT_TARGET_CPA,
};
use crate::config::{Config, DataSourceKind, Transport};
use crate::domain::entities::PerformanceReport;
use crate::domain::ports::PerformanceSource;
use crate::error::{SourceError, ToolError};

pub const SERVER_NAME: &str = "yandex-direct-monitor";

/// Days of history used by the health analysis
const HEALTH_WINDOW_DAYS: u32 = 3;

/// Days of history used for scenario planning
const SCENARIO_WINDOW_DAYS: u32 = 7;

const MAX_REPORT_DAYS: u32 = 365;

/// Yandex.Direct Monitor MCP Server
///
/// Analyses campaign reports and gives recommendations.
#[derive(Clone)]
pub struct DirectMonitorServer {
    source: Arc<dyn PerformanceSource>,
    transport: Transport,
    tool_router: ToolRouter<Self>,
}

impl DirectMonitorServer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Arc<dyn PerformanceSource> = match config.data_source {
            DataSourceKind::Demo => Arc::new(DemoSource::new()),
            DataSourceKind::Direct => Arc::new(DirectClient::from_config(config)?),
        };
        Ok(Self::new(source, config.transport))
    }

    pub fn new(source: Arc<dyn PerformanceSource>, transport: Transport) -> Self {
        Self {
            source,
            transport,
            tool_router: Self::tool_router(),
        }
    }

    pub fn data_source(&self) -> &'static str {
        self.source.kind()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    // --- Tool logic ---

    async fn performance(&self, campaign_id: &str, days: u32) -> Result<String, ToolError> {
        let campaign_id = validate_campaign_id(campaign_id)?;
        if days == 0 || days > MAX_REPORT_DAYS {
            return Err(ToolError::Validation(format!(
                "days must be between 1 and {}",
                MAX_REPORT_DAYS
            )));
        }

        match self.source.fetch(campaign_id, days).await {
            Ok(report) => to_json(&PerformanceResponse {
                status: "success",
                report: &report,
            }),
            Err(e) => {
                tracing::warn!(campaign_id, error = %e, "Failed to fetch campaign performance");
                to_json(&SourceFailure::new(campaign_id, &e))
            }
        }
    }

    async fn health_analysis(
        &self,
        campaign_id: &str,
        targets: HealthTargets,
    ) -> Result<HealthAnalysis, SourceError> {
        let report = self.source.fetch(campaign_id, HEALTH_WINDOW_DAYS).await?;
        let analysis = analysis::analyze(campaign_id, &report.metrics, targets, Local::now());
        tracing::info!(
            campaign_id,
            score = analysis.health_score,
            issues = analysis.issues.len(),
            "Campaign health analysed"
        );
        Ok(analysis)
    }

    async fn health(
        &self,
        campaign_id: &str,
        target_cpa: f64,
        daily_budget_limit: f64,
    ) -> Result<String, ToolError> {
        let campaign_id = validate_campaign_id(campaign_id)?;
        let targets = HealthTargets::new(target_cpa, daily_budget_limit)?;

        match self.health_analysis(campaign_id, targets).await {
            Ok(analysis) => to_json(&analysis),
            Err(e) => {
                tracing::warn!(campaign_id, error = %e, "Health analysis failed");
                to_json(&FailedAnalysis {
                    campaign_id,
                    analysis_status: "failed",
                    error: e.to_string(),
                })
            }
        }
    }

    async fn daily_report(&self, campaign_ids: &[String]) -> Result<String, ToolError> {
        if campaign_ids.is_empty() {
            return Err(ToolError::Validation(
                "campaign_ids must contain at least one campaign".to_string(),
            ));
        }
        let campaign_ids = campaign_ids
            .iter()
            .map(|id| validate_campaign_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        let targets = HealthTargets::new(REPORT_TARGET_CPA, REPORT_DAILY_BUDGET_LIMIT)?;

        let mut entries = Vec::with_capacity(campaign_ids.len());
        for campaign_id in campaign_ids {
            let entry = match self.health_analysis(campaign_id, targets).await {
                Ok(analysis) => CampaignEntry::Analyzed(analysis),
                Err(e) => CampaignEntry::Failed {
                    campaign_id: campaign_id.to_string(),
                    error: e.to_string(),
                },
            };
            entries.push(entry);
        }

        Ok(render_daily_report(&entries, Local::now()))
    }

    async fn scenarios(
        &self,
        campaign_id: &str,
        target_conversions: u64,
    ) -> Result<String, ToolError> {
        let campaign_id = validate_campaign_id(campaign_id)?;

        let report: PerformanceReport =
            match self.source.fetch(campaign_id, SCENARIO_WINDOW_DAYS).await {
                Ok(report) => report,
                Err(e) => return to_json(&SourceFailure::new(campaign_id, &e)),
            };

        let result = scenarios::calculate(
            campaign_id,
            &report.metrics,
            target_conversions,
            self.source.kind(),
        )?;
        to_json(&result)
    }

    fn connection_status(&self) -> Result<String, ToolError> {
        to_json(&ConnectionStatus {
            status: "ok",
            server: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
            data_source: self.source.kind(),
            transport: self.transport.as_str(),
            mode: self.transport.mode(),
            timestamp: Local::now().to_rfc3339(),
        })
    }
}

fn validate_campaign_id(campaign_id: &str) -> Result<&str, ToolError> {
    let campaign_id = campaign_id.trim();
    if campaign_id.is_empty() {
        return Err(ToolError::Validation(
            "campaign_id must not be empty".to_string(),
        ));
    }
    Ok(campaign_id)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn into_call_result(result: Result<String, ToolError>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(content) => Ok(CallToolResult::success(vec![Content::text(content)])),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

// --- Response Types ---

#[derive(Serialize)]
struct PerformanceResponse<'a> {
    status: &'static str,
    #[serde(flatten)]
    report: &'a PerformanceReport,
}

#[derive(Serialize)]
struct SourceFailure<'a> {
    status: &'static str,
    campaign_id: &'a str,
    error: String,
}

impl<'a> SourceFailure<'a> {
    fn new(campaign_id: &'a str, error: &SourceError) -> Self {
        Self {
            status: error.status(),
            campaign_id,
            error: error.to_string(),
        }
    }
}

#[derive(Serialize)]
struct FailedAnalysis<'a> {
    campaign_id: &'a str,
    analysis_status: &'static str,
    error: String,
}

#[derive(Serialize)]
struct ConnectionStatus {
    status: &'static str,
    server: &'static str,
    version: &'static str,
    data_source: &'static str,
    transport: &'static str,
    mode: &'static str,
    timestamp: String,
}

// --- Tool Parameter Types ---

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PerformanceParams {
    /// Yandex.Direct campaign ID
    pub campaign_id: String,
    /// Number of days to analyse (default 7)
    #[serde(default = "default_days")]
    pub days: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HealthParams {
    /// Yandex.Direct campaign ID
    pub campaign_id: String,
    /// Target cost per conversion, in rubles
    pub target_cpa: f64,
    /// Maximum acceptable daily spend, in rubles
    pub daily_budget_limit: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DailyReportParams {
    /// Campaign IDs to include in the report
    pub campaign_ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScenarioParams {
    /// Yandex.Direct campaign ID
    pub campaign_id: String,
    /// Desired number of conversions
    pub target_conversions: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CpaParams {
    /// Total advertising cost, in rubles
    pub cost: f64,
    /// Number of conversions achieved
    pub conversions: u64,
}

#[tool_router]
impl DirectMonitorServer {
    #[tool(
        description = "Get campaign performance for the last N days: cost, conversions, clicks, impressions, CPA, CTR, CPC and trend."
    )]
    async fn get_campaign_performance(
        &self,
        params: Parameters<PerformanceParams>,
    ) -> Result<CallToolResult, McpError> {
        into_call_result(self.performance(&params.0.campaign_id, params.0.days).await)
    }

    #[tool(
        description = "Analyse campaign health against a target CPA and daily budget limit. Returns a 0-100 score, issues, alerts and recommendations."
    )]
    async fn analyze_campaign_health(
        &self,
        params: Parameters<HealthParams>,
    ) -> Result<CallToolResult, McpError> {
        into_call_result(
            self.health(
                &params.0.campaign_id,
                params.0.target_cpa,
                params.0.daily_budget_limit,
            )
            .await,
        )
    }

    #[tool(
        description = "Generate a summary report for several campaigns (target CPA 150 RUB, daily limit 1000 RUB) with statuses, alerts and campaigns that need intervention."
    )]
    async fn generate_daily_report(
        &self,
        params: Parameters<DailyReportParams>,
    ) -> Result<CallToolResult, McpError> {
        into_call_result(self.daily_report(&params.0.campaign_ids).await)
    }

    #[tool(
        description = "Calculate budget scenarios to reach a target number of conversions: keep current CPA, improve CPA by 20%, or stay on the current budget."
    )]
    async fn calculate_scenarios(
        &self,
        params: Parameters<ScenarioParams>,
    ) -> Result<CallToolResult, McpError> {
        into_call_result(
            self.scenarios(&params.0.campaign_id, params.0.target_conversions)
                .await,
        )
    }

    #[tool(description = "Calculate CPA from cost and conversions and rate its efficiency.")]
    async fn calculate_cpa(&self, params: Parameters<CpaParams>) -> Result<CallToolResult, McpError> {
        into_call_result(
            cpa::calculate(params.0.cost, params.0.conversions).and_then(|result| to_json(&result)),
        )
    }

    #[tool(description = "Check that the server is reachable and see which data source it uses.")]
    async fn test_connection(&self) -> Result<CallToolResult, McpError> {
        into_call_result(self.connection_status())
    }
}

#[tool_handler]
impl ServerHandler for DirectMonitorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                title: Some("Yandex.Direct Monitor".into()),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                r#"Yandex.Direct Monitor - campaign report analysis and recommendations

This server reads campaign reports. It never pauses campaigns or changes bids.

TOOLS:
1. 'get_campaign_performance' - Metrics for a campaign over N days
2. 'analyze_campaign_health' - Rule-based check against target CPA and budget
3. 'generate_daily_report' - Summary across several campaigns
4. 'calculate_scenarios' - Budget needed for a conversion target
5. 'calculate_cpa' - CPA from cost and conversions
6. 'test_connection' - Check the server and its data source

HEALTH RULES:
- CPA above 150% of target: critical, stop the campaign
- CPA above 120% of target: lower bids, add negative keywords
- Average daily spend above the limit: budget overspend
- More than 50 clicks and no conversions: check the landing page
- CTR above 5% but conversion below 1%: traffic may be irrelevant

Call 'test_connection' to see whether data is live or demo."#
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{critical_metrics, healthy_metrics, FailingSource, FixedSource};
    use serde_json::Value;

    fn server_with(source: impl PerformanceSource + 'static) -> DirectMonitorServer {
        DirectMonitorServer::new(Arc::new(source), Transport::StreamableHttp)
    }

    fn parse(text: String) -> Value {
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_all_tools_are_registered() {
        let server = server_with(FixedSource::new());
        let mut names = server.tool_names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "analyze_campaign_health",
                "calculate_cpa",
                "calculate_scenarios",
                "generate_daily_report",
                "get_campaign_performance",
                "test_connection",
            ]
        );
    }

    #[test]
    fn test_performance_params_default_days() {
        let json = r#"{"campaign_id": "12345"}"#;
        let params: PerformanceParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.campaign_id, "12345");
        assert_eq!(params.days, 7);
    }

    #[test]
    fn test_cpa_params_reject_negative_conversions() {
        let json = r#"{"cost": 100.0, "conversions": -1}"#;
        assert!(serde_json::from_str::<CpaParams>(json).is_err());
    }

    #[test]
    fn test_daily_report_params_deserialize() {
        let json = r#"{"campaign_ids": ["1", "2"]}"#;
        let params: DailyReportParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.campaign_ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_performance_success_payload() {
        let source = FixedSource::new().with_campaign("12345", healthy_metrics());
        let server = server_with(source.clone());

        let json = parse(server.performance(" 12345 ", 14).await.unwrap());

        assert_eq!(json["status"], "success");
        assert_eq!(json["campaign_id"], "12345");
        assert_eq!(json["metrics"]["avg_cpa"], 100.0);
        assert_eq!(source.requests(), vec![("12345".to_string(), 14)]);
    }

    #[tokio::test]
    async fn test_performance_failure_payload() {
        let server = server_with(FixedSource::new());
        let json = parse(server.performance("missing", 7).await.unwrap());
        assert_eq!(json["status"], "no_data");
        assert_eq!(json["campaign_id"], "missing");

        let server = server_with(FailingSource::new(500));
        let json = parse(server.performance("1", 7).await.unwrap());
        assert_eq!(json["status"], "api_error");
        assert!(json["error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_performance_validates_input() {
        let server = server_with(FixedSource::new());
        assert!(server.performance("  ", 7).await.is_err());
        assert!(server.performance("1", 0).await.is_err());
        assert!(server.performance("1", 366).await.is_err());
    }

    #[tokio::test]
    async fn test_health_uses_three_day_window() {
        let source = FixedSource::new().with_campaign("777", critical_metrics());
        let server = server_with(source.clone());

        let json = parse(server.health("777", 150.0, 1000.0).await.unwrap());

        assert_eq!(json["health_score"], 20);
        assert_eq!(json["status"], "critical");
        assert_eq!(json["action_required"], true);
        assert_eq!(json["issues"][0], "CPA_CRITICAL");
        assert_eq!(json["targets"]["target_cpa"], 150.0);
        assert_eq!(source.requests(), vec![("777".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_health_reports_failed_fetch() {
        let server = server_with(FailingSource::new(503));
        let json = parse(server.health("1", 150.0, 1000.0).await.unwrap());
        assert_eq!(json["analysis_status"], "failed");
        assert_eq!(json["campaign_id"], "1");
    }

    #[tokio::test]
    async fn test_health_rejects_invalid_targets() {
        let server = server_with(FixedSource::new());
        let err = server.health("1", 0.0, 1000.0).await.unwrap_err();
        assert!(err.to_string().contains("target_cpa"));
    }

    #[tokio::test]
    async fn test_daily_report_mixes_results() {
        let source = FixedSource::new()
            .with_campaign("1", healthy_metrics())
            .with_campaign("2", critical_metrics());
        let server = server_with(source);

        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let report = server.daily_report(&ids).await.unwrap();

        assert!(report.contains("Campaigns analyzed: 3"));
        assert!(report.contains("🟢 Campaign 1:"));
        assert!(report.contains("🔴 Campaign 2:"));
        assert!(report.contains("⚪ Campaign 3:"));
        assert!(report.contains("ATTENTION: 1 campaigns"));
    }

    #[tokio::test]
    async fn test_daily_report_requires_campaigns() {
        let server = server_with(FixedSource::new());
        assert!(server.daily_report(&[]).await.is_err());
    }

    #[tokio::test]
    async fn test_daily_report_rejects_blank_campaign_id() {
        let source = FixedSource::new().with_campaign("1", healthy_metrics());
        let server = server_with(source.clone());

        let ids = vec!["1".to_string(), "  ".to_string()];
        let err = server.daily_report(&ids).await.unwrap_err();

        assert!(err.to_string().contains("campaign_id"));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_scenarios_use_source_metrics() {
        let source = FixedSource::new().with_campaign("5", healthy_metrics());
        let server = server_with(source.clone());

        let json = parse(server.scenarios("5", 30).await.unwrap());

        assert_eq!(json["current_performance"]["cpa"], 100.0);
        assert_eq!(json["scenarios"]["keep_current_cpa"]["required_budget"], 3000.0);
        assert_eq!(source.requests(), vec![("5".to_string(), 7)]);
    }

    #[tokio::test]
    async fn test_scenarios_report_source_failure() {
        let server = server_with(FixedSource::new());
        let json = parse(server.scenarios("5", 30).await.unwrap());
        assert_eq!(json["status"], "no_data");
    }

    #[test]
    fn test_connection_status_payload() {
        let server = server_with(FixedSource::new());
        let json = parse(server.connection_status().unwrap());
        assert_eq!(json["status"], "ok");
        assert_eq!(json["server"], SERVER_NAME);
        assert_eq!(json["data_source"], "fixed");
        assert_eq!(json["transport"], "streamable-http");
        assert_eq!(json["mode"], "stateless");
    }

    #[test]
    fn test_connection_status_over_stdio() {
        let server = DirectMonitorServer::new(Arc::new(FixedSource::new()), Transport::Stdio);
        let json = parse(server.connection_status().unwrap());
        assert_eq!(json["transport"], "stdio");
        assert_eq!(json["mode"], "session");
    }

    #[test]
    fn test_server_info() {
        let server = server_with(FixedSource::new());
        let info = server.get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }
}
