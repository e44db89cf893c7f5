use std::env;

use crate::error::ConfigError;

pub const DEFAULT_REPORTS_URL: &str = "https://api.direct.yandex.com/json/v5/reports";

/// Where campaign performance comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// Synthetic data, no credentials needed
    Demo,
    /// Yandex.Direct Reports API
    Direct,
}

impl DataSourceKind {
    /// Pick the data source. An explicit setting wins; otherwise a configured
    /// token selects the live API.
    pub fn resolve(explicit: Option<&str>, token: &str) -> Result<Self, ConfigError> {
        let kind = match explicit.map(|s| s.trim().to_lowercase()) {
            Some(value) if value.is_empty() => Self::from_token(token),
            Some(value) => match value.as_str() {
                "demo" => DataSourceKind::Demo,
                "direct" => DataSourceKind::Direct,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "DATA_SOURCE",
                        value: value.clone(),
                    })
                }
            },
            None => Self::from_token(token),
        };

        if kind == DataSourceKind::Direct && token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(kind)
    }

    fn from_token(token: &str) -> Self {
        if token.is_empty() {
            DataSourceKind::Demo
        } else {
            DataSourceKind::Direct
        }
    }
}

/// MCP transport the server is exposed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    StreamableHttp,
    Stdio,
}

impl Transport {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "http" | "streamable-http" => Ok(Transport::StreamableHttp),
            "stdio" => Ok(Transport::Stdio),
            other => Err(ConfigError::InvalidValue {
                name: "MCP_TRANSPORT",
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::StreamableHttp => "streamable-http",
            Transport::Stdio => "stdio",
        }
    }

    /// HTTP requests are served without sessions; stdio is one long session
    pub fn mode(&self) -> &'static str {
        match self {
            Transport::StreamableHttp => "stateless",
            Transport::Stdio => "session",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub transport: Transport,
    /// Mount path of the MCP service in the HTTP router
    pub mcp_path: String,
    pub data_source: DataSourceKind,
    pub yandex_api_token: String,
    pub yandex_api_url: String,
    /// Client-Login header for agency accounts
    pub yandex_client_login: Option<String>,
    /// Polling attempts while the Reports API is still building a report
    pub report_max_retries: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8000,
        };

        let transport = match lookup("MCP_TRANSPORT") {
            Some(raw) => Transport::parse(&raw)?,
            None => Transport::StreamableHttp,
        };

        let report_max_retries = match lookup("REPORT_MAX_RETRIES") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "REPORT_MAX_RETRIES",
                    value: raw,
                })?,
            None => 5,
        };

        let yandex_api_token = lookup("YANDEX_API_TOKEN").unwrap_or_default();
        let data_source =
            DataSourceKind::resolve(lookup("DATA_SOURCE").as_deref(), &yandex_api_token)?;

        let mcp_path = match lookup("MCP_PATH") {
            Some(raw) => parse_mcp_path(&raw)?,
            None => "/mcp".to_string(),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            transport,
            mcp_path,
            data_source,
            yandex_api_token,
            yandex_api_url: lookup("YANDEX_API_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_REPORTS_URL.to_string()),
            yandex_client_login: lookup("YANDEX_CLIENT_LOGIN").filter(|login| !login.is_empty()),
            report_max_retries,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The MCP service is nested in the router, so it cannot sit at the root
/// or end with a slash.
fn parse_mcp_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.ends_with('/') {
        return Err(ConfigError::InvalidValue {
            name: "MCP_PATH",
            value: raw.to_string(),
        });
    }

    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{}", trimmed))
    }
}
