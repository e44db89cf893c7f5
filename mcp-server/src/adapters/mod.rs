//! Adapters layer
//!
//! Concrete implementations of the domain port traits.

pub mod demo;
pub mod direct;

pub use demo::DemoSource;
pub use direct::DirectClient;
