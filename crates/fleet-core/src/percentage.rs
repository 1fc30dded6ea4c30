//! Fixed-point percentage arithmetic (1e18 scale)
//!
//! Ratios such as allocation caps and withdrawal fractions are carried as
//! `Percentage` values where `PERCENTAGE_FACTOR` represents 100%.

use core::fmt;

use crate::math::mul_div_floor;

/// Raw value representing 100%
pub const PERCENTAGE_FACTOR: u128 = 1_000_000_000_000_000_000;

/// Fixed-point ratio, 1e18 = 100%
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Percentage(u128);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const ONE_HUNDRED: Percentage = Percentage(PERCENTAGE_FACTOR);

    /// Wrap a raw 1e18-scaled value
    pub fn from_raw(raw: u128) -> Self {
        Percentage(raw)
    }

    /// Whole-percent constructor: `from_percent(25)` is 25%
    pub fn from_percent(pct: u64) -> Self {
        Percentage(pct as u128 * (PERCENTAGE_FACTOR / 100))
    }

    /// Ratio `num / den` as a percentage. `None` on zero divisor or overflow.
    pub fn from_fraction(num: u128, den: u128) -> Option<Self> {
        mul_div_floor(num, PERCENTAGE_FACTOR, den).map(Percentage)
    }

    pub fn raw(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Percentage) -> Option<Percentage> {
        self.0.checked_add(other.0).map(Percentage)
    }

    pub fn checked_sub(self, other: Percentage) -> Option<Percentage> {
        self.0.checked_sub(other.0).map(Percentage)
    }

    pub fn checked_mul(self, other: Percentage) -> Option<Percentage> {
        mul_div_floor(self.0, other.0, PERCENTAGE_FACTOR).map(Percentage)
    }

    pub fn checked_div(self, other: Percentage) -> Option<Percentage> {
        mul_div_floor(self.0, PERCENTAGE_FACTOR, other.0).map(Percentage)
    }

    /// Floor of `amount * self`. `None` on overflow.
    pub fn of(self, amount: u128) -> Option<u128> {
        mul_div_floor(amount, self.0, PERCENTAGE_FACTOR)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Two decimal places: raw * 10_000 / FACTOR gives hundredths of a percent
        let hundredths = mul_div_floor(self.0, 10_000, PERCENTAGE_FACTOR).unwrap_or(u128::MAX);
        write!(f, "{}.{:02}%", hundredths / 100, hundredths % 100)
    }
}
