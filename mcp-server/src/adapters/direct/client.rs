//! HTTP client for the Yandex.Direct Reports API
//!
//! Only read access is used: the server requests campaign performance
//! reports and never changes campaigns.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::StatusCode;
use serde::Serialize;

use super::tsv::{detect_trend, parse_daily_rows};
use crate::config::Config;
use crate::domain::entities::{CampaignMetrics, DataOrigin, PerformanceReport};
use crate::domain::ports::PerformanceSource;
use crate::error::SourceError;

/// Longest wait honoured from a `retryIn` header, in seconds
const MAX_RETRY_IN_SECS: u64 = 10;

/// Error bodies are truncated to this many characters
const ERROR_BODY_LIMIT: usize = 200;

const FIELD_NAMES: [&str; 5] = ["Date", "Clicks", "Cost", "Impressions", "Conversions"];

#[derive(Clone)]
pub struct DirectClient {
    client: reqwest::Client,
    reports_url: String,
    max_attempts: u32,
}

impl DirectClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.yandex_api_url,
            &config.yandex_api_token,
            config.yandex_client_login.as_deref(),
            config.report_max_retries,
        )
    }

    /// Create a new client with explicit configuration
    pub fn new(
        reports_url: &str,
        token: &str,
        client_login: Option<&str>,
        max_attempts: u32,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Invalid API token format")?,
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ru"));
        for (name, value) in [
            ("skipreportheader", "true"),
            ("skipcolumnheader", "false"),
            ("skipreportsummary", "true"),
            ("returnmoneyinmicros", "false"),
            ("processingmode", "auto"),
        ] {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        if let Some(login) = client_login {
            headers.insert(
                HeaderName::from_static("client-login"),
                HeaderValue::from_str(login).context("Invalid Client-Login format")?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            reports_url: reports_url.to_string(),
            max_attempts: max_attempts.max(1),
        })
    }

    #[cfg(test)]
    pub fn reports_url(&self) -> &str {
        &self.reports_url
    }

    /// Request a report, polling while the API is still building it
    async fn request_report(&self, body: &ReportRequest) -> Result<String, SourceError> {
        for attempt in 1..=self.max_attempts {
            let response = self.client.post(&self.reports_url).json(body).send().await?;
            let status = response.status();

            match status {
                StatusCode::OK => return Ok(response.text().await?),
                StatusCode::CREATED | StatusCode::ACCEPTED => {
                    let wait = retry_in(response.headers());
                    tracing::debug!(
                        attempt,
                        wait_secs = wait.as_secs(),
                        "Report queued, retrying"
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                _ => {
                    let text = response.text().await.unwrap_or_default();
                    return Err(SourceError::Api {
                        status: status.as_u16(),
                        body: text.chars().take(ERROR_BODY_LIMIT).collect(),
                    });
                }
            }
        }

        Err(SourceError::ReportNotReady(self.max_attempts))
    }
}

fn retry_in(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get("retryin")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1);
    Duration::from_secs(secs.min(MAX_RETRY_IN_SECS))
}

#[async_trait]
impl PerformanceSource for DirectClient {
    async fn fetch(&self, campaign_id: &str, days: u32) -> Result<PerformanceReport, SourceError> {
        let date_to = Local::now().date_naive();
        let date_from = date_to - chrono::Duration::days(i64::from(days));
        let request = ReportRequest::campaign_performance(campaign_id, date_from, date_to);

        tracing::info!(campaign_id, %date_from, %date_to, "Requesting campaign report");
        let body = self.request_report(&request).await?;
        let rows = parse_daily_rows(&body)?;

        let clicks: u64 = rows.iter().map(|r| r.clicks).sum();
        let cost: f64 = rows.iter().map(|r| r.cost).sum();
        let impressions: u64 = rows.iter().map(|r| r.impressions).sum();
        let conversions: u64 = rows.iter().map(|r| r.conversions).sum();

        Ok(PerformanceReport {
            campaign_id: campaign_id.to_string(),
            period_days: days,
            source: DataOrigin::YandexDirect,
            data_trend: detect_trend(&rows),
            metrics: CampaignMetrics::from_totals(
                cost,
                conversions,
                clicks,
                impressions,
                rows.len() as u32,
            ),
            period: Some(format!("{} - {}", date_from, date_to)),
            note: None,
        })
    }

    fn kind(&self) -> &'static str {
        DataOrigin::YandexDirect.as_str()
    }
}

// --- Request Types ---

#[derive(Debug, Serialize)]
struct ReportRequest {
    params: ReportParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReportParams {
    selection_criteria: SelectionCriteria,
    field_names: Vec<&'static str>,
    report_name: String,
    report_type: &'static str,
    date_range_type: &'static str,
    format: &'static str,
    #[serde(rename = "IncludeVAT")]
    include_vat: &'static str,
    include_discount: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SelectionCriteria {
    filter: Vec<Filter>,
    date_from: String,
    date_to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Filter {
    field: &'static str,
    operator: &'static str,
    values: Vec<String>,
}

impl ReportRequest {
    fn campaign_performance(campaign_id: &str, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        let date_from = date_from.format("%Y-%m-%d").to_string();
        let date_to = date_to.format("%Y-%m-%d").to_string();

        Self {
            params: ReportParams {
                report_name: format!("Campaign_{}_{}_{}", campaign_id, date_from, date_to),
                selection_criteria: SelectionCriteria {
                    filter: vec![Filter {
                        field: "CampaignId",
                        operator: "EQUALS",
                        values: vec![campaign_id.to_string()],
                    }],
                    date_from,
                    date_to,
                },
                field_names: FIELD_NAMES.to_vec(),
                report_type: "CAMPAIGN_PERFORMANCE_REPORT",
                date_range_type: "CUSTOM_DATE",
                format: "TSV",
                include_vat: "NO",
                include_discount: "NO",
            },
        }
    }
}
