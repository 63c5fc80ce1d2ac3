//! Test Data Builders
//!
//! Lets tests state only the parts of a bill they care about.

use domain_billing::Bill;

/// Builder for constructing test bills
///
/// Panics on invalid input; tests that exercise rejection should call the
/// bill methods directly.
#[derive(Debug, Clone, Default)]
pub struct TestBillBuilder {
    charge: i64,
    adjustments: Vec<(i64, String)>,
    description: Option<String>,
    active: bool,
}

impl TestBillBuilder {
    /// Creates a builder for an active bill with no charge
    pub fn new() -> Self {
        Self {
            active: true,
            ..Default::default()
        }
    }

    /// Sets the charge
    pub fn charge(mut self, charge: i64) -> Self {
        self.charge = charge;
        self
    }

    /// Appends an adjustment
    pub fn adjustment(mut self, amount: i64, reason: impl Into<String>) -> Self {
        self.adjustments.push((amount, reason.into()));
        self
    }

    /// Sets the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the bill as belonging to a closed cycle
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the bill
    pub fn build<P>(self) -> Bill<P> {
        let mut bill = Bill::new();
        bill.set_charge(self.charge).expect("builder charge must be valid");
        for (amount, reason) in self.adjustments {
            bill.add_adjustment(amount, reason).expect("builder adjustment must be valid");
        }
        if let Some(description) = self.description {
            bill.set_description(description);
        }
        bill.set_active(self.active);
        bill
    }
}
