//! Custom Test Assertions
//!
//! Assertions for the accounting properties every bill group must hold,
//! with messages that show the offending figures.

use std::fmt::Debug;

use domain_billing::{BillGroup, SplitAmount};
use rust_decimal::Decimal;

/// Asserts that the liabilities of every payor sum to exactly zero
///
/// # Panics
///
/// Panics if any liability cannot be calculated or the sum is not zero
pub fn assert_zero_sum<P>(group: &BillGroup<P>)
where
    P: Clone + Ord + Debug,
{
    let liabilities: Vec<(P, SplitAmount)> = group
        .payors()
        .map(|p| {
            let liability = group
                .calculate_liability_for(p)
                .unwrap_or_else(|e| panic!("liability for {:?} failed: {}", p, e));
            (p.clone(), liability)
        })
        .collect();

    let sum = SplitAmount::checked_sum(liabilities.iter().map(|(_, l)| l))
        .expect("liability sum overflowed");

    assert!(
        sum.is_zero(),
        "Liabilities sum to {} instead of zero: {:?}",
        sum,
        liabilities
    );
}

/// Asserts that per-payor contributions add up to the group total
pub fn assert_contributions_additive<P>(group: &BillGroup<P>)
where
    P: Clone + Ord + Debug,
{
    let sum: i128 = group
        .payors()
        .map(|p| group.contribution_for(p).expect("enrolled payor"))
        .sum();

    assert_eq!(
        sum,
        group.contribution_total(),
        "Sum of contributions ({}) doesn't equal contribution total ({})",
        sum,
        group.contribution_total()
    );
}

/// Asserts that an exact amount equals a decimal figure
pub fn assert_amount_eq(actual: SplitAmount, expected: Decimal) {
    let decimal = actual.to_decimal().expect("amount fits a decimal");
    assert_eq!(
        decimal, expected,
        "Amount {} ({}) doesn't equal expected {}",
        actual, decimal, expected
    );
}
