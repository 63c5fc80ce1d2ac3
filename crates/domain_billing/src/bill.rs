//! Bills and their adjustments
//!
//! A bill is a single charge, such as a utility bill or a grocery run with
//! many line items, plus a ledger of signed adjustments. A negative
//! adjustment might deduct personal items from a shared grocery bill; a
//! positive one might add a late fee. The total of a bill can never be
//! driven below zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, UserId};
use crate::error::BillingError;

/// A signed modification to a bill's charge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Amount in minor currency units (negative for discounts)
    pub amount: i64,
    /// Human-readable reason
    pub reason: String,
}

/// A single charge with adjustments, attributed to the payor who paid it
///
/// # Invariants
///
/// - `charge >= 0`
/// - `total() >= 0` after every accepted mutation
/// - A rejected mutation leaves the bill exactly as it was
/// - `owner` is set only when the bill joins a [`BillGroup`](crate::BillGroup)
///
/// Deserialization checks the charge and total rules, so a stored snapshot
/// that breaks them is rejected instead of loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BillRecord<P>",
    bound(deserialize = "P: Deserialize<'de>")
)]
pub struct Bill<P> {
    id: BillId,
    charge: i64,
    adjustments: Vec<Adjustment>,
    owner: Option<P>,
    active: bool,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A bill paid by a host-application user
pub type UserBill = Bill<UserId>;

/// Unchecked wire form of a [`Bill`]
#[derive(Deserialize)]
struct BillRecord<P> {
    id: BillId,
    charge: i64,
    adjustments: Vec<Adjustment>,
    owner: Option<P>,
    active: bool,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<P> TryFrom<BillRecord<P>> for Bill<P> {
    type Error = BillingError;

    fn try_from(record: BillRecord<P>) -> Result<Self, Self::Error> {
        if record.charge < 0 {
            return Err(BillingError::NegativeCharge(record.charge));
        }

        let bill = Self {
            id: record.id,
            charge: record.charge,
            adjustments: record.adjustments,
            owner: record.owner,
            active: record.active,
            description: record.description,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        bill.check_total_after(0)?;
        Ok(bill)
    }
}

impl<P> Bill<P> {
    /// Creates an empty, active bill with no owner
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new_v7(),
            charge: 0,
            adjustments: Vec::new(),
            owner: None,
            active: true,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a description (e.g. "March electricity")
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> BillId {
        self.id
    }

    /// Returns the current charge
    pub fn charge(&self) -> i64 {
        self.charge
    }

    /// Replaces the charge, holding adjustments fixed
    ///
    /// # Errors
    ///
    /// - `NegativeCharge` if `value < 0`
    /// - `NegativeTotal` if the adjustments would then take the total below zero
    /// - `AmountOverflow` if the total would exceed `i64::MAX`
    pub fn set_charge(&mut self, value: i64) -> Result<(), BillingError> {
        if value < 0 {
            return Err(BillingError::NegativeCharge(value));
        }

        let change = value as i128 - self.charge as i128;
        self.check_total_after(change)?;

        self.charge = value;
        self.touch();
        Ok(())
    }

    /// Appends an adjustment
    ///
    /// # Errors
    ///
    /// - `NegativeTotal` if `total() + amount < 0`
    /// - `AmountOverflow` if the total would exceed `i64::MAX`
    pub fn add_adjustment(&mut self, amount: i64, reason: impl Into<String>) -> Result<(), BillingError> {
        self.check_total_after(amount as i128)?;

        self.adjustments.push(Adjustment {
            amount,
            reason: reason.into(),
        });
        self.touch();
        Ok(())
    }

    /// Returns the adjustments in the order they were added
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Returns `charge + sum(adjustments)`
    pub fn total(&self) -> i64 {
        // mutations and deserialization keep the total within 0..=i64::MAX
        i64::try_from(self.exact_total()).unwrap_or(i64::MAX)
    }

    /// Returns the payor this bill is attributed to, if any
    pub fn owner(&self) -> Option<&P> {
        self.owner.as_ref()
    }

    pub(crate) fn assign_owner(&mut self, owner: P) {
        self.owner = Some(owner);
        self.touch();
    }

    /// Returns true while the bill belongs to an open billing cycle
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.touch();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
        self.touch();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn exact_total(&self) -> i128 {
        self.adjustments
            .iter()
            .fold(self.charge as i128, |total, adjustment| total + adjustment.amount as i128)
    }

    fn check_total_after(&self, change: i128) -> Result<(), BillingError> {
        let current = self.exact_total();
        let total = current + change;

        if total < 0 {
            return Err(BillingError::NegativeTotal {
                total: i64::try_from(current).unwrap_or(i64::MIN),
                change,
            });
        }
        if total > i64::MAX as i128 {
            return Err(BillingError::AmountOverflow(format!(
                "bill {} total would reach {}",
                self.id, total
            )));
        }

        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl<P> Default for Bill<P> {
    fn default() -> Self {
        Self::new()
    }
}
