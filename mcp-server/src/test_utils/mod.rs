//! Test utilities
//!
//! Hand-written performance sources and fixtures for unit tests.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
