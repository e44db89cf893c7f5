//! In-memory performance sources
//!
//! Sources return configured data and record the requests they receive so
//! tests can verify how tools call them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::entities::{CampaignMetrics, PerformanceReport};
use crate::domain::ports::PerformanceSource;
use crate::error::SourceError;

use super::fixtures::test_report;

/// Returns fixed metrics per campaign; unknown campaigns have no data
#[derive(Default, Clone)]
pub struct FixedSource {
    metrics: Arc<RwLock<HashMap<String, CampaignMetrics>>>,
    pub requests: Arc<RwLock<Vec<(String, u32)>>>,
}

impl FixedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_campaign(self, campaign_id: &str, metrics: CampaignMetrics) -> Self {
        self.metrics
            .write()
            .unwrap()
            .insert(campaign_id.to_string(), metrics);
        self
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl PerformanceSource for FixedSource {
    async fn fetch(&self, campaign_id: &str, days: u32) -> Result<PerformanceReport, SourceError> {
        self.requests
            .write()
            .unwrap()
            .push((campaign_id.to_string(), days));

        let metrics = self.metrics.read().unwrap().get(campaign_id).cloned();
        match metrics {
            Some(metrics) => Ok(test_report(campaign_id, metrics)),
            None => Err(SourceError::NoData),
        }
    }

    fn kind(&self) -> &'static str {
        "fixed"
    }
}

/// Always fails with an API error
pub struct FailingSource {
    pub status: u16,
}

impl FailingSource {
    pub fn new(status: u16) -> Self {
        Self { status }
    }
}

#[async_trait]
impl PerformanceSource for FailingSource {
    async fn fetch(&self, _campaign_id: &str, _days: u32) -> Result<PerformanceReport, SourceError> {
        Err(SourceError::Api {
            status: self.status,
            body: "unavailable".to_string(),
        })
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}
