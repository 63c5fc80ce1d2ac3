//! Exact split amounts
//!
//! Splitting a cent-denominated pot by integer weights produces fractions
//! (a third of 100 cents is not a whole number of cents). `SplitAmount`
//! keeps those fractions exact as a reduced ratio of integers so that the
//! liabilities of a bill group always sum to exactly zero. Conversion to
//! `rust_decimal` happens only at the presentation edge.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use crate::error::BillingError;

/// An exact, possibly fractional, amount in minor currency units
///
/// # Invariants
///
/// - The denominator is always positive
/// - Numerator and denominator share no common factor
///
/// Because the representation is canonical, derived equality is numeric equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitAmount {
    numerator: i128,
    denominator: i128,
}

impl SplitAmount {
    /// The zero amount
    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
        }
    }

    /// Creates a whole amount
    pub fn from_integer(value: i128) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }

    /// Creates `numerator / denominator`, reduced to lowest terms
    ///
    /// Returns `None` when the denominator is zero or the sign cannot be
    /// normalised without overflow.
    pub fn new(numerator: i128, denominator: i128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }

        let (numerator, denominator) = if denominator < 0 {
            (numerator.checked_neg()?, denominator.checked_neg()?)
        } else {
            (numerator, denominator)
        };

        let divisor = gcd(numerator.unsigned_abs(), denominator.unsigned_abs());
        // divisor <= denominator <= i128::MAX
        let divisor = divisor as i128;

        Some(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn numerator(&self) -> i128 {
        self.numerator
    }

    pub fn denominator(&self) -> i128 {
        self.denominator
    }

    /// Returns true if this amount has no fractional part
    pub fn is_whole(&self) -> bool {
        self.denominator == 1
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_positive(&self) -> bool {
        self.numerator > 0
    }

    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    /// Checked addition, `None` on overflow
    pub fn checked_add(&self, other: &SplitAmount) -> Option<SplitAmount> {
        if self.denominator == other.denominator {
            return Self::new(
                self.numerator.checked_add(other.numerator)?,
                self.denominator,
            );
        }

        let left = self.numerator.checked_mul(other.denominator)?;
        let right = other.numerator.checked_mul(self.denominator)?;
        Self::new(
            left.checked_add(right)?,
            self.denominator.checked_mul(other.denominator)?,
        )
    }

    /// Checked subtraction, `None` on overflow
    pub fn checked_sub(&self, other: &SplitAmount) -> Option<SplitAmount> {
        self.checked_add(&other.checked_neg()?)
    }

    /// Checked negation, `None` when the numerator is `i128::MIN`
    pub fn checked_neg(&self) -> Option<SplitAmount> {
        Some(Self {
            numerator: self.numerator.checked_neg()?,
            denominator: self.denominator,
        })
    }

    /// Sums a sequence of amounts, `None` on overflow
    pub fn checked_sum<'a, I>(amounts: I) -> Option<SplitAmount>
    where
        I: IntoIterator<Item = &'a SplitAmount>,
    {
        amounts
            .into_iter()
            .try_fold(SplitAmount::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Converts to a decimal with up to 28 significant digits
    ///
    /// Non-terminating fractions (thirds, sevenths) are truncated by the
    /// decimal division, so use this for display, never for balancing.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if either part exceeds the 96-bit decimal mantissa
    pub fn to_decimal(&self) -> Result<Decimal, BillingError> {
        let overflow = || BillingError::AmountOverflow(format!("{} does not fit a decimal", self));

        let numerator = Decimal::try_from_i128_with_scale(self.numerator, 0).map_err(|_| overflow())?;
        let denominator = Decimal::try_from_i128_with_scale(self.denominator, 0).map_err(|_| overflow())?;

        numerator.checked_div(denominator).ok_or_else(overflow)
    }

    /// Rounds to `dp` decimal places of the minor unit using banker's rounding
    pub fn round_dp(&self, dp: u32) -> Result<Decimal, BillingError> {
        Ok(self
            .to_decimal()?
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
    }

    /// Converts cents to major units (e.g. dollars) rounded to `dp` places
    pub fn to_major_units(&self, dp: u32) -> Result<Decimal, BillingError> {
        let major = self.to_decimal()? / Decimal::ONE_HUNDRED;
        Ok(major.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
    }
}

impl Default for SplitAmount {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for SplitAmount {
    fn from(value: i64) -> Self {
        Self::from_integer(value as i128)
    }
}

impl Neg for SplitAmount {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the numerator is `i128::MIN`, like negating the primitive.
    /// Use [`SplitAmount::checked_neg`] where that value can occur.
    fn neg(self) -> Self {
        match self.checked_neg() {
            Some(negated) => negated,
            None => panic!("attempt to negate {} with overflow", self),
        }
    }
}

impl PartialOrd for SplitAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SplitAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.numerator.signum().cmp(&other.numerator.signum());
        if sign != Ordering::Equal || self.numerator == 0 {
            return sign;
        }

        let magnitude = cmp_magnitudes(
            self.numerator.unsigned_abs(),
            self.denominator as u128,
            other.numerator.unsigned_abs(),
            other.denominator as u128,
        );
        if self.numerator < 0 {
            magnitude.reverse()
        } else {
            magnitude
        }
    }
}

impl fmt::Display for SplitAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Compares `a/b` with `c/d` for non-negative fractions without multiplying
///
/// Compares whole parts, then the remainders through their reciprocals,
/// which is the continued fraction expansion of both values.
fn cmp_magnitudes(mut a: u128, mut b: u128, mut c: u128, mut d: u128) -> Ordering {
    loop {
        let whole = (a / b).cmp(&(c / d));
        if whole != Ordering::Equal {
            return whole;
        }

        let (left, right) = (a % b, c % d);
        match (left, right) {
            (0, 0) => return Ordering::Equal,
            (0, _) => return Ordering::Less,
            (_, 0) => return Ordering::Greater,
            // left/b vs right/d orders the same way as d/right vs b/left
            _ => (a, b, c, d) = (d, right, b, left),
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reduces_to_lowest_terms() {
        let amount = SplitAmount::new(-175, 2).unwrap();
        assert_eq!(amount, SplitAmount::new(-350, 4).unwrap());
        assert_eq!(amount.numerator(), -175);
        assert_eq!(amount.denominator(), 2);
    }

    #[test]
    fn test_sign_moves_to_numerator() {
        let amount = SplitAmount::new(3, -6).unwrap();
        assert_eq!(amount.numerator(), -1);
        assert_eq!(amount.denominator(), 2);
        assert!(amount.is_negative());
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(SplitAmount::new(1, 0).is_none());
    }

    #[test]
    fn test_zero_is_canonical() {
        assert_eq!(SplitAmount::new(0, 7).unwrap(), SplitAmount::zero());
    }

    #[test]
    fn test_thirds_sum_exactly() {
        let third = SplitAmount::new(100, 3).unwrap();
        let total = SplitAmount::checked_sum(&[third, third, third]).unwrap();
        assert_eq!(total, SplitAmount::from_integer(100));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(SplitAmount::new(-175, 2).unwrap().to_decimal().unwrap(), dec!(-87.5));
        assert_eq!(SplitAmount::new(845, 2).unwrap().round_dp(0).unwrap(), dec!(422));
    }

    #[test]
    fn test_to_major_units() {
        let amount = SplitAmount::new(-175, 2).unwrap();
        assert_eq!(amount.to_major_units(2).unwrap(), dec!(-0.88));
    }

    #[test]
    fn test_ordering() {
        let half = SplitAmount::new(1, 2).unwrap();
        let third = SplitAmount::new(1, 3).unwrap();
        assert!(third < half);
        assert!(-half < third);
    }

    #[test]
    fn test_ordering_of_large_coprime_amounts() {
        let larger = SplitAmount::new(i128::MAX, 2).unwrap();
        let smaller = SplitAmount::new(i128::MAX - 2, 3).unwrap();

        assert_ne!(larger, smaller);
        assert_eq!(larger.cmp(&smaller), Ordering::Greater);
        assert_eq!(smaller.cmp(&larger), Ordering::Less);
        assert!(-larger < -smaller);
        assert_eq!(larger.cmp(&larger), Ordering::Equal);
    }

    #[test]
    fn test_ordering_with_equal_whole_parts() {
        let a = SplitAmount::new(i128::MAX, i128::MAX - 1).unwrap();
        let b = SplitAmount::new(i128::MAX - 1, i128::MAX - 2).unwrap();
        // 1 + 1/(MAX-1) < 1 + 1/(MAX-2)
        assert!(a < b);
        assert!(SplitAmount::from_integer(i128::MIN) < SplitAmount::new(i128::MIN + 1, 3).unwrap());
    }

    #[test]
    fn test_checked_neg_at_the_boundary() {
        let min = SplitAmount::from_integer(i128::MIN);
        assert!(min.checked_neg().is_none());

        let max = SplitAmount::from_integer(i128::MAX);
        assert_eq!(-(-max), max);
        assert_eq!(-max, SplitAmount::from_integer(i128::MIN + 1));
    }

    #[test]
    #[should_panic(expected = "with overflow")]
    fn test_neg_panics_instead_of_saturating() {
        let _ = -SplitAmount::from_integer(i128::MIN);
    }

    #[test]
    fn test_display() {
        assert_eq!(SplitAmount::from_integer(-335).to_string(), "-335");
        assert_eq!(SplitAmount::new(845, 2).unwrap().to_string(), "845/2");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ordering_matches_cross_multiplication(
            a in -1_000_000i128..1_000_000,
            b in 1i128..10_000,
            c in -1_000_000i128..1_000_000,
            d in 1i128..10_000,
        ) {
            let left = SplitAmount::new(a, b).unwrap();
            let right = SplitAmount::new(c, d).unwrap();
            prop_assert_eq!(left.cmp(&right), (a * d).cmp(&(c * b)));
            prop_assert_eq!(left.cmp(&right) == Ordering::Equal, left == right);
        }
    }
}
