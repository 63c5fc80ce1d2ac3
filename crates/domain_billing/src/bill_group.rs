//! Shared bill groups
//!
//! A bill group is a set of bills whose cost is split between several
//! payors. Adding a bill records that its payor has already paid it: the
//! bill total is that payor's contribution to a shared pot, which is then
//! redistributed according to each payor's liability weight.
//!
//! # Proportional settlement
//!
//! With weights `w`, total weight `W`, pot `T` and contribution `c`:
//!
//! ```text
//! fair_share(p) = w(p) / W * T
//! liability(p)  = fair_share(p) - c(p)
//! ```
//!
//! A positive liability means the payor under-contributed and owes the pot;
//! a negative one means they are owed a refund. Since both fair shares and
//! contributions sum to `T`, liabilities sum to exactly zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;

use core_kernel::{BillGroupId, BillId, UserId};
use crate::amount::SplitAmount;
use crate::bill::Bill;
use crate::error::BillingError;
use crate::settlement::Settlement;

/// A ledger of payors and the bills they have paid
///
/// # Invariants
///
/// - Every weight is positive
/// - Every bill is owned by a payor in the roster
/// - A bill appears at most once
/// - A payor who owns bills cannot be removed
///
/// Deserialization re-checks these invariants before a stored group is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BillGroupRecord<P>",
    bound(deserialize = "P: Deserialize<'de> + Debug")
)]
pub struct BillGroup<P: Ord> {
    id: BillGroupId,
    name: Option<String>,
    payors: BTreeMap<P, u64>,
    bills: Vec<Bill<P>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A bill group whose payors are host-application users
pub type UserBillGroup = BillGroup<UserId>;

/// Unchecked wire form of a [`BillGroup`]
#[derive(Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
struct BillGroupRecord<P: Ord> {
    id: BillGroupId,
    name: Option<String>,
    payors: BTreeMap<P, u64>,
    bills: Vec<Bill<P>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<P> TryFrom<BillGroupRecord<P>> for BillGroup<P>
where
    P: Ord + Debug,
{
    type Error = BillingError;

    fn try_from(record: BillGroupRecord<P>) -> Result<Self, Self::Error> {
        for (payor, weight) in &record.payors {
            match i64::try_from(*weight) {
                Ok(0) => return Err(BillingError::NonPositiveWeight(0)),
                Ok(_) => {}
                Err(_) => {
                    return Err(BillingError::AmountOverflow(format!(
                        "weight {} of payor {:?}",
                        weight, payor
                    )))
                }
            }
        }

        let mut seen = HashSet::new();
        for bill in &record.bills {
            if !seen.insert(bill.id()) {
                return Err(BillingError::BillAlreadyInGroup(bill.id().to_string()));
            }
            match bill.owner() {
                Some(owner) if record.payors.contains_key(owner) => {}
                Some(owner) => return Err(BillingError::PayorNotFound(format!("{:?}", owner))),
                None => {
                    return Err(BillingError::PayorNotFound(format!(
                        "no owner recorded for bill {}",
                        bill.id()
                    )))
                }
            }
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            payors: record.payors,
            bills: record.bills,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl<P> BillGroup<P>
where
    P: Clone + Ord + Debug,
{
    /// Creates an empty bill group
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: BillGroupId::new_v7(),
            name: None,
            payors: BTreeMap::new(),
            bills: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> BillGroupId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
        self.touch();
    }

    /// Adds a payor, or replaces the weight of one already in the roster
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveWeight` if `weight <= 0`
    pub fn add_or_update_payor(&mut self, payor: P, weight: i64) -> Result<(), BillingError> {
        if weight <= 0 {
            return Err(BillingError::NonPositiveWeight(weight));
        }

        self.payors.insert(payor, weight as u64);
        self.touch();
        Ok(())
    }

    /// Removes a payor from the roster, returning their weight
    ///
    /// A payor who still owns bills must be settled outside the group first,
    /// otherwise their contribution history would silently disappear.
    ///
    /// # Errors
    ///
    /// - `PayorNotFound` if the payor is not enrolled
    /// - `PayorHasBills` if any bill is attributed to them
    pub fn remove_payor(&mut self, payor: &P) -> Result<u64, BillingError> {
        if !self.payors.contains_key(payor) {
            return Err(Self::payor_not_found(payor));
        }

        let count = self.bills_for(payor).count();
        if count > 0 {
            return Err(BillingError::PayorHasBills {
                payor: format!("{:?}", payor),
                count,
            });
        }

        let weight = self.payors.remove(payor).unwrap_or_default();
        self.touch();
        Ok(weight)
    }

    /// Returns the payors in the roster, in payor order
    pub fn payors(&self) -> impl Iterator<Item = &P> + '_ {
        self.payors.keys()
    }

    /// Returns true if the payor is enrolled
    pub fn has_payor(&self, payor: &P) -> bool {
        self.payors.contains_key(payor)
    }

    /// Returns the liability weight of a payor
    pub fn weight_of(&self, payor: &P) -> Option<u64> {
        self.payors.get(payor).copied()
    }

    /// Returns the sum of all weights (zero only for an empty roster)
    pub fn weight_total(&self) -> i128 {
        self.payors.values().map(|w| *w as i128).sum()
    }

    /// Attributes a bill to a payor and adds it to the group
    ///
    /// # Errors
    ///
    /// - `PayorNotFound` if the payor is not enrolled
    /// - `BillAlreadyInGroup` if a bill with the same id is already present
    pub fn add_bill(&mut self, mut bill: Bill<P>, payor: P) -> Result<BillId, BillingError> {
        if !self.payors.contains_key(&payor) {
            return Err(Self::payor_not_found(&payor));
        }
        if self.contains_bill(&bill.id()) {
            return Err(BillingError::BillAlreadyInGroup(bill.id().to_string()));
        }

        let bill_id = bill.id();
        bill.assign_owner(payor);
        self.bills.push(bill);
        self.touch();
        Ok(bill_id)
    }

    /// Returns true if a bill with this id is in the group
    pub fn contains_bill(&self, bill_id: &BillId) -> bool {
        self.bills.iter().any(|b| &b.id() == bill_id)
    }

    /// Returns the bills in the order they were added
    pub fn bills(&self) -> &[Bill<P>] {
        &self.bills
    }

    /// Gets a bill by id
    pub fn bill(&self, bill_id: &BillId) -> Option<&Bill<P>> {
        self.bills.iter().find(|b| &b.id() == bill_id)
    }

    /// Returns the bills attributed to a payor
    pub fn bills_for<'a>(&'a self, payor: &'a P) -> impl Iterator<Item = &'a Bill<P>> + 'a {
        self.bills.iter().filter(move |b| b.owner() == Some(payor))
    }

    /// Replaces the charge of a bill in the group
    ///
    /// See [`Bill::set_charge`] for the validation rules.
    pub fn set_charge(&mut self, bill_id: &BillId, value: i64) -> Result<(), BillingError> {
        self.bill_mut(bill_id)?.set_charge(value)?;
        self.touch();
        Ok(())
    }

    /// Adds an adjustment to a bill in the group
    ///
    /// See [`Bill::add_adjustment`] for the validation rules.
    pub fn add_adjustment(
        &mut self,
        bill_id: &BillId,
        amount: i64,
        reason: impl Into<String>,
    ) -> Result<(), BillingError> {
        self.bill_mut(bill_id)?.add_adjustment(amount, reason)?;
        self.touch();
        Ok(())
    }

    /// Sets the activity flag of a bill in the group
    pub fn set_bill_active(&mut self, bill_id: &BillId, active: bool) -> Result<(), BillingError> {
        self.bill_mut(bill_id)?.set_active(active);
        self.touch();
        Ok(())
    }

    /// Returns the sum of the totals of the bills a payor has paid
    ///
    /// # Errors
    ///
    /// Returns `PayorNotFound` if the payor is not enrolled
    pub fn contribution_for(&self, payor: &P) -> Result<i128, BillingError> {
        if !self.payors.contains_key(payor) {
            return Err(Self::payor_not_found(payor));
        }

        Ok(self.bills_for(payor).map(|b| b.total() as i128).sum())
    }

    /// Returns the sum of the totals of every bill in the group
    pub fn contribution_total(&self) -> i128 {
        self.bills.iter().map(|b| b.total() as i128).sum()
    }

    /// Returns the payor's weight-proportional share of the pot
    ///
    /// # Errors
    ///
    /// Returns `PayorNotFound` if the payor is not enrolled
    pub fn fair_share_for(&self, payor: &P) -> Result<SplitAmount, BillingError> {
        let weight = self.weight_of(payor).ok_or_else(|| Self::payor_not_found(payor))?;
        let weight_total = self.weight_total();
        if weight_total == 0 {
            return Ok(SplitAmount::zero());
        }

        let share = (weight as i128)
            .checked_mul(self.contribution_total())
            .ok_or_else(|| Self::overflow(payor))?;

        SplitAmount::new(share, weight_total).ok_or_else(|| Self::overflow(payor))
    }

    /// Calculates how far a payor's contribution is from their fair share
    ///
    /// Positive: the payor owes the pot. Negative: the pot owes the payor.
    /// Always recomputed from current state; summing over every payor gives
    /// exactly zero.
    ///
    /// # Errors
    ///
    /// - `PayorNotFound` if the payor is not enrolled
    /// - `AmountOverflow` if the exact arithmetic exceeds 128 bits
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_billing::{Bill, BillGroup, SplitAmount};
    ///
    /// let mut group = BillGroup::new();
    /// group.add_or_update_payor(1, 1).unwrap();
    /// group.add_or_update_payor(2, 1).unwrap();
    ///
    /// let mut bill = Bill::new();
    /// bill.set_charge(100).unwrap();
    /// group.add_bill(bill, 1).unwrap();
    ///
    /// assert_eq!(group.calculate_liability_for(&1).unwrap(), SplitAmount::from_integer(-50));
    /// assert_eq!(group.calculate_liability_for(&2).unwrap(), SplitAmount::from_integer(50));
    /// ```
    pub fn calculate_liability_for(&self, payor: &P) -> Result<SplitAmount, BillingError> {
        let numerator = self.liability_numerator(payor)?;
        let weight_total = self.weight_total();
        if weight_total == 0 {
            return Ok(SplitAmount::zero());
        }

        SplitAmount::new(numerator, weight_total).ok_or_else(|| Self::overflow(payor))
    }

    /// Produces a settlement statement covering every payor
    pub fn settlement(&self) -> Result<Settlement<P>, BillingError> {
        Settlement::for_group(self)
    }

    /// Liability scaled by the total weight: `w(p) * T - c(p) * W`
    ///
    /// Every payor shares the denominator `W`, so these numerators sum to zero.
    pub(crate) fn liability_numerator(&self, payor: &P) -> Result<i128, BillingError> {
        let weight = self.weight_of(payor).ok_or_else(|| Self::payor_not_found(payor))?;
        let contribution = self.contribution_for(payor)?;
        let weight_total = self.weight_total();

        let fair = (weight as i128).checked_mul(self.contribution_total());
        let paid = contribution.checked_mul(weight_total);

        match (fair, paid) {
            (Some(fair), Some(paid)) => fair.checked_sub(paid).ok_or_else(|| Self::overflow(payor)),
            _ => Err(Self::overflow(payor)),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn bill_mut(&mut self, bill_id: &BillId) -> Result<&mut Bill<P>, BillingError> {
        self.bills
            .iter_mut()
            .find(|b| &b.id() == bill_id)
            .ok_or_else(|| BillingError::BillNotFound(bill_id.to_string()))
    }

    fn payor_not_found(payor: &P) -> BillingError {
        BillingError::PayorNotFound(format!("{:?}", payor))
    }

    fn overflow(payor: &P) -> BillingError {
        BillingError::AmountOverflow(format!("liability for payor {:?}", payor))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl<P> Default for BillGroup<P>
where
    P: Clone + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn liabilities_sum_to_zero(
            weights in prop::collection::vec(1i64..1_000, 1..8),
            charges in prop::collection::vec((0usize..8, 0i64..1_000_000), 0..20)
        ) {
            let mut group = BillGroup::new();
            for (payor, weight) in weights.iter().enumerate() {
                group.add_or_update_payor(payor, *weight).unwrap();
            }
            for (payor, charge) in charges {
                let mut bill = Bill::new();
                bill.set_charge(charge).unwrap();
                group.add_bill(bill, payor % weights.len()).unwrap();
            }

            let liabilities: Vec<SplitAmount> = (0..weights.len())
                .map(|p| group.calculate_liability_for(&p).unwrap())
                .collect();
            prop_assert_eq!(SplitAmount::checked_sum(&liabilities), Some(SplitAmount::zero()));
        }

        #[test]
        fn contributions_are_additive(
            weights in prop::collection::vec(1i64..100, 1..6),
            charges in prop::collection::vec((0usize..6, 0i64..100_000), 0..20)
        ) {
            let mut group = BillGroup::new();
            for (payor, weight) in weights.iter().enumerate() {
                group.add_or_update_payor(payor, *weight).unwrap();
            }
            for (payor, charge) in charges {
                let mut bill = Bill::new();
                bill.set_charge(charge).unwrap();
                group.add_bill(bill, payor % weights.len()).unwrap();
            }

            let sum: i128 = (0..weights.len())
                .map(|p| group.contribution_for(&p).unwrap())
                .sum();
            prop_assert_eq!(sum, group.contribution_total());
        }
    }
}
