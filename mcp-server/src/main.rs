//! Yandex.Direct Monitor MCP Server
//!
//! This MCP server gives AI agents read-only insight into Yandex.Direct
//! advertising campaigns. It exposes tools for:
//! - Fetching campaign performance
//! - Rule-based campaign health analysis
//! - Daily summary reports across campaigns
//! - Budget scenarios and CPA calculation
//!
//! Tools are served over streamable HTTP (stateless) or stdio.

mod adapters;
mod analysis;
mod config;
mod domain;
mod error;
mod server;

#[cfg(test)]
mod test_utils;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::ServiceExt;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, Transport};
use server::{DirectMonitorServer, SERVER_NAME};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// HTTP routes: the MCP service under `mcp_path` plus a health probe
fn app_router(server: DirectMonitorServer, mcp_path: &str) -> Router {
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(health))
        .nest_service(mcp_path, mcp_service)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Loads .env as well, so RUST_LOG from the file applies below
    let config = Config::from_env().context("Invalid configuration")?;

    // Log to stderr (stdout is used for MCP protocol in stdio mode)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,direct_monitor_mcp=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let server = DirectMonitorServer::from_config(&config)?;

    tracing::info!(
        server = SERVER_NAME,
        transport = config.transport.as_str(),
        data_source = server.data_source(),
        "Starting Yandex.Direct Monitor MCP server (reports and recommendations, no campaign management)"
    );
    for name in server.tool_names() {
        tracing::info!(tool = %name, "Registered tool");
    }

    match config.transport {
        Transport::StreamableHttp => {
            let addr = config.bind_addr();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening on http://{}{} (stateless)", addr, config.mcp_path);

            axum::serve(listener, app_router(server, &config.mcp_path))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("HTTP server error")?;
        }
        Transport::Stdio => {
            // Serve over stdio - pass as tuple (stdin, stdout)
            let transport = (tokio::io::stdin(), tokio::io::stdout());
            let service = server.serve(transport).await?;
            service.waiting().await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
