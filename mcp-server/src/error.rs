//! Error types for the monitor server
//!
//! - `SourceError`: failures while fetching campaign performance
//! - `ToolError`: invalid tool input
//! - `ConfigError`: invalid environment configuration

use thiserror::Error;

/// Performance source errors (demo generator or Reports API)
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No data for the requested period")]
    NoData,

    #[error("Report is still being built after {0} attempts")]
    ReportNotReady(u32),

    #[error("Failed to parse report: {0}")]
    Parse(String),
}

impl SourceError {
    /// Status string reported to MCP clients in place of `success`
    pub fn status(&self) -> &'static str {
        match self {
            SourceError::NoData => "no_data",
            SourceError::Api { .. } => "api_error",
            SourceError::Request(_) | SourceError::ReportNotReady(_) | SourceError::Parse(_) => {
                "exception"
            }
        }
    }
}

/// Tool input errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Cannot calculate CPA with zero conversions")]
    ZeroConversions,

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("Invalid {name} value: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("DATA_SOURCE=direct requires YANDEX_API_TOKEN")]
    MissingToken,
}
