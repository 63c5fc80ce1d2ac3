//! Settlement statements
//!
//! A settlement is the read-only report a household sees at the end of a
//! cycle: for each payor, what they paid, what their weighted share of the
//! pot is, and the gap between the two. Like a trial balance, it carries a
//! balance check over the whole statement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::amount::SplitAmount;
use crate::bill_group::BillGroup;
use crate::error::BillingError;

/// One payor's position in a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine<P> {
    /// The payor
    pub payor: P,
    /// Liability weight
    pub weight: u64,
    /// Sum of the bills this payor paid
    pub contribution: i128,
    /// Weight-proportional share of the pot
    pub fair_share: SplitAmount,
    /// `fair_share - contribution`
    pub liability: SplitAmount,
}

/// Settlement statement for a bill group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement<P> {
    /// One line per payor in the roster, in payor order
    pub lines: Vec<SettlementLine<P>>,
    /// Sum of every bill in the group
    pub contribution_total: i128,
    /// Sum of every payor's liability
    pub liability_total: SplitAmount,
    /// Whether the liabilities cancel out
    pub is_balanced: bool,
}

impl<P> Settlement<P>
where
    P: Clone + Ord + Debug,
{
    /// Builds the statement from the current state of a group
    pub fn for_group(group: &BillGroup<P>) -> Result<Self, BillingError> {
        let weight_total = group.weight_total();
        let mut lines = Vec::new();
        let mut numerator_total: i128 = 0;

        for payor in group.payors() {
            let numerator = group.liability_numerator(payor)?;
            numerator_total = numerator_total.checked_add(numerator).ok_or_else(|| {
                BillingError::AmountOverflow("settlement liability total".to_string())
            })?;

            lines.push(SettlementLine {
                payor: payor.clone(),
                weight: group.weight_of(payor).unwrap_or_default(),
                contribution: group.contribution_for(payor)?,
                fair_share: group.fair_share_for(payor)?,
                liability: group.calculate_liability_for(payor)?,
            });
        }

        let liability_total = if weight_total == 0 {
            SplitAmount::zero()
        } else {
            SplitAmount::new(numerator_total, weight_total).ok_or_else(|| {
                BillingError::AmountOverflow("settlement liability total".to_string())
            })?
        };

        Ok(Self {
            lines,
            contribution_total: group.contribution_total(),
            is_balanced: liability_total.is_zero(),
            liability_total,
        })
    }

    /// Returns the line for a payor
    pub fn line_for(&self, payor: &P) -> Option<&SettlementLine<P>> {
        self.lines.iter().find(|line| &line.payor == payor)
    }

    /// Payors who under-contributed, with what they owe
    pub fn owing(&self) -> impl Iterator<Item = &SettlementLine<P>> + '_ {
        self.lines.iter().filter(|line| line.liability.is_positive())
    }

    /// Payors who over-contributed, with what they are owed (as a negative liability)
    pub fn owed(&self) -> impl Iterator<Item = &SettlementLine<P>> + '_ {
        self.lines.iter().filter(|line| line.liability.is_negative())
    }

    /// Liabilities rounded to `dp` decimal places of the minor unit
    ///
    /// Rounded figures are for display; they need not sum to zero.
    pub fn rounded_liabilities(&self, dp: u32) -> Result<Vec<(P, Decimal)>, BillingError> {
        self.lines
            .iter()
            .map(|line| Ok((line.payor.clone(), line.liability.round_dp(dp)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::Bill;
    use rust_decimal_macros::dec;

    fn three_way_split() -> BillGroup<&'static str> {
        let mut group = BillGroup::new();
        for payor in ["ana", "ben", "cat"] {
            group.add_or_update_payor(payor, 1).unwrap();
        }
        let mut bill = Bill::new();
        bill.set_charge(100).unwrap();
        group.add_bill(bill, "ana").unwrap();
        group
    }

    #[test]
    fn test_thirds_balance_exactly() {
        let settlement = three_way_split().settlement().unwrap();

        assert!(settlement.is_balanced);
        assert_eq!(settlement.contribution_total, 100);
        assert_eq!(settlement.lines.len(), 3);

        let ana = settlement.line_for(&"ana").unwrap();
        assert_eq!(ana.contribution, 100);
        assert_eq!(ana.fair_share, SplitAmount::new(100, 3).unwrap());
        assert_eq!(ana.liability, SplitAmount::new(-200, 3).unwrap());
    }

    #[test]
    fn test_owing_and_owed() {
        let settlement = three_way_split().settlement().unwrap();

        let owing: Vec<&str> = settlement.owing().map(|line| line.payor).collect();
        assert_eq!(owing, vec!["ben", "cat"]);

        let owed: Vec<&str> = settlement.owed().map(|line| line.payor).collect();
        assert_eq!(owed, vec!["ana"]);
    }

    #[test]
    fn test_rounded_liabilities() {
        let settlement = three_way_split().settlement().unwrap();
        let rounded = settlement.rounded_liabilities(2).unwrap();
        let ben = rounded.iter().find(|(payor, _)| *payor == "ben").unwrap();
        assert_eq!(ben.1, dec!(33.33));
    }

    #[test]
    fn test_empty_group_is_balanced() {
        let group: BillGroup<u8> = BillGroup::new();
        let settlement = group.settlement().unwrap();
        assert!(settlement.lines.is_empty());
        assert!(settlement.is_balanced);
    }

    #[test]
    fn test_statement_is_stable_across_enrolment_order() {
        let mut reversed = BillGroup::new();
        for payor in ["cat", "ben", "ana"] {
            reversed.add_or_update_payor(payor, 1).unwrap();
        }
        let mut bill = Bill::new();
        bill.set_charge(100).unwrap();
        reversed.add_bill(bill, "ana").unwrap();

        let forward = three_way_split().settlement().unwrap();
        let backward = reversed.settlement().unwrap();

        let payors: Vec<&str> = backward.lines.iter().map(|line| line.payor).collect();
        assert_eq!(payors, vec!["ana", "ben", "cat"]);
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            serde_json::to_string(&backward).unwrap()
        );
    }
}
