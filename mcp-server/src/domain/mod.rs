//! Domain layer
//!
//! Campaign performance types and the port traits the tools depend on.

pub mod entities;
pub mod ports;
