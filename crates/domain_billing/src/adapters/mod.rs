//! Store adapters for the billing domain
//!
//! # Available Adapters
//!
//! - **InMemoryBillGroupStore**: JSON snapshots held in memory, for tests
//!   and for hosts that persist elsewhere

pub mod memory;

pub use memory::InMemoryBillGroupStore;
