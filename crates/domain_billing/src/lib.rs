//! Billing Domain - Shared Bill Liability Engine
//!
//! This crate splits the cost of shared household bills between payors in
//! proportion to their liability weights, and reports how far each payor's
//! contribution is from their fair share.
//!
//! # Concepts
//!
//! - **Bill**: a charge plus signed adjustments; its total never goes negative
//! - **BillGroup**: a roster of weighted payors and the bills each has paid
//! - **Liability**: fair share minus contribution; positive owes, negative is owed
//!
//! Liabilities are exact rationals ([`SplitAmount`]), so across a group they
//! always sum to exactly zero.
//!
//! # Example
//!
//! ```rust
//! use domain_billing::{Bill, BillGroup, SplitAmount};
//!
//! let mut group = BillGroup::new();
//! group.add_or_update_payor(1, 10).unwrap();
//! group.add_or_update_payor(2, 25).unwrap();
//! group.add_or_update_payor(3, 65).unwrap();
//!
//! let mut rent = Bill::new();
//! rent.set_charge(400).unwrap();
//! group.add_bill(rent, 1).unwrap();
//!
//! let mut power = Bill::new();
//! power.set_charge(250).unwrap();
//! group.add_bill(power, 2).unwrap();
//!
//! assert_eq!(group.calculate_liability_for(&1).unwrap(), SplitAmount::from_integer(-335));
//! assert!(group.settlement().unwrap().is_balanced);
//! ```

pub mod amount;
pub mod bill;
pub mod bill_group;
pub mod settlement;
pub mod input;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod config;
pub mod error;

pub use amount::SplitAmount;
pub use bill::{Adjustment, Bill, UserBill};
pub use bill_group::{BillGroup, UserBillGroup};
pub use settlement::{Settlement, SettlementLine};
pub use ports::BillGroupStore;
pub use adapters::InMemoryBillGroupStore;
pub use service::BillSplitService;
pub use config::BillSplitConfig;
pub use error::{BillingError, ErrorKind};
