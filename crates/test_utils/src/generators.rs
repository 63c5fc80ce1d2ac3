//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating rosters and bill plans that
//! respect the engine's input rules.

use proptest::prelude::*;

/// A bill to be added to a generated group
#[derive(Debug, Clone)]
pub struct BillPlan {
    /// Index into the generated roster
    pub payor_index: usize,
    /// Charge in minor units
    pub charge: i64,
    /// Adjustments to attempt, some of which may be rejected
    pub adjustments: Vec<i64>,
}

/// Strategy for valid liability weights
pub fn weight_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000i64
}

/// Strategy for invalid (non-positive) weights
pub fn non_positive_weight_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..=0i64
}

/// Strategy for charges in minor units
pub fn charge_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000i64
}

/// Strategy for signed adjustments, biased towards values that can fail
pub fn adjustment_strategy() -> impl Strategy<Value = i64> {
    -20_000_000i64..20_000_000i64
}

/// Strategy for a roster of one to eight weights
pub fn roster_strategy() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(weight_strategy(), 1..8)
}

/// Strategy for a single bill plan
pub fn bill_plan_strategy() -> impl Strategy<Value = BillPlan> {
    (
        0usize..8usize,
        charge_strategy(),
        prop::collection::vec(adjustment_strategy(), 0..5),
    )
        .prop_map(|(payor_index, charge, adjustments)| BillPlan {
            payor_index,
            charge,
            adjustments,
        })
}

/// Strategy for a roster and the bills its payors pay
pub fn group_plan_strategy() -> impl Strategy<Value = (Vec<i64>, Vec<BillPlan>)> {
    (roster_strategy(), prop::collection::vec(bill_plan_strategy(), 0..20))
}
