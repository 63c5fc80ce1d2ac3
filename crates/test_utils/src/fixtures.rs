//! Pre-built Test Fixtures
//!
//! Groups and bills shaped like the ones a household actually keeps.

use core_kernel::UserId;
use domain_billing::{Bill, BillGroup, UserBillGroup};

use crate::builders::TestBillBuilder;

/// Fixture for bill test data
pub struct BillFixtures;

impl BillFixtures {
    /// A bill with a charge and no adjustments
    pub fn charged<P>(charge: i64) -> Bill<P> {
        TestBillBuilder::new().charge(charge).build()
    }

    /// Charge 100 with adjustments +200, -50 and 0 (total 250)
    pub fn adjusted<P>() -> Bill<P> {
        TestBillBuilder::new()
            .charge(100)
            .adjustment(200, "Adjustment 1")
            .adjustment(-50, "Adjustment 2")
            .adjustment(0, "Adjustment 3")
            .build()
    }
}

/// Fixture for bill group test data
pub struct GroupFixtures;

impl GroupFixtures {
    /// Payors 1, 2 and 3 weighted 10, 25 and 65; payor 1 paid 400, payor 2 paid 250
    pub fn weighted_household() -> BillGroup<u32> {
        let mut group = BillGroup::new().with_name("Weighted household");
        group.add_or_update_payor(1, 10).expect("valid weight");
        group.add_or_update_payor(2, 25).expect("valid weight");
        group.add_or_update_payor(3, 65).expect("valid weight");
        group.add_bill(BillFixtures::charged(400), 1).expect("enrolled payor");
        group.add_bill(BillFixtures::charged(250), 2).expect("enrolled payor");
        group
    }

    /// Payors `1..people`, each weighted by their own number
    ///
    /// Everyone pays one bill of 200 adjusted down by 100. Even-numbered
    /// payors also pay a bill of 50 adjusted up by 25.
    pub fn odd_even(people: u32) -> BillGroup<u32> {
        let mut group = BillGroup::new();
        for payor in 1..people {
            group.add_or_update_payor(payor, payor as i64).expect("valid weight");

            let first = TestBillBuilder::new()
                .charge(200)
                .adjustment(-100, "Adjustment 1")
                .build();
            group.add_bill(first, payor).expect("enrolled payor");

            if payor % 2 == 0 {
                let second = TestBillBuilder::new()
                    .charge(50)
                    .adjustment(25, "Adjustment 2")
                    .build();
                group.add_bill(second, payor).expect("enrolled payor");
            }
        }
        group
    }

    /// Two equally weighted housemates with no bills yet
    pub fn housemates() -> (UserBillGroup, UserId, UserId) {
        let alice = UserId::new_v7();
        let bob = UserId::new_v7();

        let mut group = UserBillGroup::new().with_name("Housemates");
        group.add_or_update_payor(alice, 1).expect("valid weight");
        group.add_or_update_payor(bob, 1).expect("valid weight");
        (group, alice, bob)
    }
}
