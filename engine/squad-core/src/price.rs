//! Price type and the selling-price formula
//!
//! All prices are integers in tenths of a currency unit, matching the
//! data feed's representation (e.g. 125 = 12.5).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A price or balance in tenths of a currency unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price {
    pub tenths: i64,
}

impl Price {
    pub const ZERO: Price = Price { tenths: 0 };

    pub fn from_tenths(tenths: i64) -> Self {
        Self { tenths }
    }

    pub fn to_tenths(self) -> i64 {
        self.tenths
    }

    pub fn is_negative(self) -> bool {
        self.tenths < 0
    }

    pub fn abs(self) -> Self {
        Self { tenths: self.tenths.abs() }
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { tenths: self.tenths + rhs.tenths }
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.tenths += rhs.tenths;
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { tenths: self.tenths - rhs.tenths }
    }
}

impl SubAssign for Price {
    fn sub_assign(&mut self, rhs: Self) {
        self.tenths -= rhs.tenths;
    }
}

impl Neg for Price {
    type Output = Self;

    fn neg(self) -> Self {
        Self { tenths: -self.tenths }
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self {
        iter.fold(Price::ZERO, |acc, p| acc + p)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.tenths < 0 { "-" } else { "" };
        let abs = self.tenths.abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

/// Selling price for a player, given what the participant paid and the
/// player's current feed price.
///
/// Half of any profit is kept, floored to a tenth; a loss never marks
/// the price down below what was paid.
pub fn selling_price(purchase: Price, current: Price) -> Price {
    let profit = current.tenths - purchase.tenths;
    let profit_to_keep = if profit > 0 { profit / 2 } else { 0 };
    Price::from_tenths(purchase.tenths + profit_to_keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_arithmetic() {
        let a = Price::from_tenths(55);
        let b = Price::from_tenths(40);
        assert_eq!(a + b, Price::from_tenths(95));
        assert_eq!(a - b, Price::from_tenths(15));
        assert_eq!(-a, Price::from_tenths(-55));
        assert_eq!(vec![a, b].into_iter().sum::<Price>(), Price::from_tenths(95));
    }

    #[test]
    fn price_display() {
        assert_eq!(Price::from_tenths(125).to_string(), "12.5");
        assert_eq!(Price::from_tenths(-3).to_string(), "-0.3");
        assert_eq!(Price::from_tenths(100).to_string(), "10.0");
    }

    #[test]
    fn selling_price_splits_profit() {
        // Bought at 10.0, now 11.0: half the 1.0 profit is kept.
        let sell = selling_price(Price::from_tenths(100), Price::from_tenths(110));
        assert_eq!(sell, Price::from_tenths(105));
    }

    #[test]
    fn selling_price_floors_odd_profit() {
        // Profit of 0.3 keeps 0.1, not 0.15.
        let sell = selling_price(Price::from_tenths(100), Price::from_tenths(103));
        assert_eq!(sell, Price::from_tenths(101));
    }

    #[test]
    fn selling_price_never_marks_down_a_loss() {
        // Bought at 10.0, now 8.0: still sells at 10.0.
        let sell = selling_price(Price::from_tenths(100), Price::from_tenths(80));
        assert_eq!(sell, Price::from_tenths(100));
    }

    #[test]
    fn selling_price_never_exceeds_current_on_profit() {
        for current in 100..140 {
            let sell = selling_price(Price::from_tenths(100), Price::from_tenths(current));
            assert!(sell.to_tenths() <= current);
            assert!(sell.to_tenths() >= 100);
        }
    }
}
