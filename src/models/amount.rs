//! Fixed-point monetary amounts, tax rates and the rounding policy.
//!
//! Monetary values are stored as scaled integers (five fractional digits for
//! amounts, two for tax rates) so that totals never drift the way binary
//! floating point does. `rust_decimal` carries the intermediate arithmetic
//! and every conversion to and from display decimals; a conversion is always
//! explicit and one-directional, precisions are never mixed silently.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Fractional digits carried by monetary amounts.
pub const AMOUNT_PRECISION: u32 = 5;

/// Fractional digits carried by tax rates.
pub const RATE_PRECISION: u32 = 2;

/// Per-document rounding policy. Applied to every per-line computation
/// before aggregation so historical totals match bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Round half away from zero (commercial rounding).
    #[default]
    Standard,
    /// Legacy truncation toward zero.
    Floor,
}

impl RoundingMode {
    pub(crate) fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Standard => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Floor => RoundingStrategy::ToZero,
        }
    }
}

/// Monetary value as an integer scaled to [`AMOUNT_PRECISION`] digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Wrap an already-scaled integer value.
    pub fn from_scaled(raw: i64) -> Self {
        Amount(raw)
    }

    /// The raw scaled integer.
    pub fn scaled(self) -> i64 {
        self.0
    }

    /// Convert a display decimal into the scaled representation, rounding
    /// per the given mode. Saturates at the i64 boundary.
    pub fn from_decimal(value: Decimal, mode: RoundingMode) -> Self {
        let scaled = value.round_dp_with_strategy(AMOUNT_PRECISION, mode.strategy())
            * Decimal::from(10i64.pow(AMOUNT_PRECISION));
        match scaled.to_i64() {
            Some(raw) => Amount(raw),
            None if value.is_sign_negative() => Amount(i64::MIN),
            None => Amount(i64::MAX),
        }
    }

    /// Convert to the display decimal with [`AMOUNT_PRECISION`] digits.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, AMOUNT_PRECISION)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Tax rate percentage as an integer scaled to [`RATE_PRECISION`] digits
/// (2000 = 20.00 %).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaxRate(i32);

impl TaxRate {
    pub const ZERO: TaxRate = TaxRate(0);

    pub fn from_scaled(raw: i32) -> Self {
        TaxRate(raw)
    }

    pub fn scaled(self) -> i32 {
        self.0
    }

    /// Convert a display percentage (e.g. `20.00`) to the scaled form.
    pub fn from_decimal(value: Decimal) -> Self {
        let scaled = (value * Decimal::from(10i32.pow(RATE_PRECISION)))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        TaxRate(scaled.to_i32().unwrap_or_default())
    }

    /// Convert to the display percentage with [`RATE_PRECISION`] digits.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0 as i64, RATE_PRECISION)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} %", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amount_decimal_round_trip() {
        let amount = Amount::from_decimal(
            Decimal::from_str("125.37").unwrap(),
            RoundingMode::Standard,
        );
        assert_eq!(amount.scaled(), 12_537_000);
        assert_eq!(amount.to_decimal(), Decimal::from_str("125.37000").unwrap());
    }

    #[test]
    fn test_standard_rounding_is_half_away_from_zero() {
        let up = Amount::from_decimal(
            Decimal::from_str("0.000015").unwrap(),
            RoundingMode::Standard,
        );
        assert_eq!(up.scaled(), 2);

        let down = Amount::from_decimal(
            Decimal::from_str("-0.000015").unwrap(),
            RoundingMode::Standard,
        );
        assert_eq!(down.scaled(), -2);
    }

    #[test]
    fn test_floor_rounding_truncates_toward_zero() {
        let positive = Amount::from_decimal(
            Decimal::from_str("0.000019").unwrap(),
            RoundingMode::Floor,
        );
        assert_eq!(positive.scaled(), 1);

        let negative = Amount::from_decimal(
            Decimal::from_str("-0.000019").unwrap(),
            RoundingMode::Floor,
        );
        assert_eq!(negative.scaled(), -1);
    }

    #[test]
    fn test_tax_rate_scaling() {
        let rate = TaxRate::from_decimal(Decimal::from_str("5.5").unwrap());
        assert_eq!(rate.scaled(), 550);
        assert_eq!(rate.to_decimal(), Decimal::from_str("5.50").unwrap());
    }

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::from_scaled(10_000_000);
        let b = Amount::from_scaled(2_500_000);
        assert_eq!((a + b).scaled(), 12_500_000);
        assert_eq!((a - b).scaled(), 7_500_000);
        assert_eq!((-a).scaled(), -10_000_000);
        assert_eq!([a, b].into_iter().sum::<Amount>().scaled(), 12_500_000);
    }
}
