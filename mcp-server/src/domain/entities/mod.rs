//! Domain entities

pub mod performance;

pub use performance::{round2, CampaignMetrics, DataOrigin, PerformanceReport, Trend};
