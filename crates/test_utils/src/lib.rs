//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! bill split test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built payors, bills and bill groups
//! - `builders`: Builder for bills with sensible defaults
//! - `assertions`: Assertions for the group-wide accounting properties
//! - `generators`: Property-based test data generators
//! - `telemetry`: One-time tracing setup for test runs

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod telemetry;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use telemetry::*;
