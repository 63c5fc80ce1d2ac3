//! Core Kernel - Shared vocabulary for the household billing workspace
//!
//! This crate provides the building blocks used by the domain crates:
//! - Strongly-typed identifiers for users, bills and bill groups
//! - The port error type and marker trait for persistence adapters

pub mod identifiers;
pub mod ports;

pub use identifiers::{UserId, BillId, BillGroupId};
pub use ports::{PortError, DomainPort};
