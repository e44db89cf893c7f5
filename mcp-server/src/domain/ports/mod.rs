//! Domain ports (traits)
//!
//! Adapters provide concrete implementations of these traits.

pub mod performance_source;

pub use performance_source::PerformanceSource;
