use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const THB_CURRENCY_CODE: &str = "THB";
pub const THB_CURRENCY_CODE_LOWER: &str = "thb";

/// An amount of money in minor currency units (satang for THB). All arithmetic in the order
/// pipeline is integer arithmetic on this type; decimal strings only appear at the processor
/// boundary.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MinorUnits(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in minor currency units: {0}")]
pub struct MinorUnitsConversionError(String);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for MinorUnits {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for MinorUnits {}

impl TryFrom<u64> for MinorUnits {
    type Error = MinorUnitsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MinorUnitsConversionError(format!("Value {value} is too large to convert to MinorUnits")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Add for MinorUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for MinorUnits {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for MinorUnits {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for MinorUnits {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<i64> for MinorUnits {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let baht = self.0 as f64 / 100.0;
        write!(f, "{baht:0.2}฿")
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Renders the amount as the decimal string the payment processor expects, e.g. `100.00`.
    pub fn to_processor_string(&self) -> String {
        format!("{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

#[cfg(test)]
mod test {
    use super::MinorUnits;

    #[test]
    fn arithmetic() {
        let a = MinorUnits::from(10_000);
        let b = MinorUnits::from(2_500);
        assert_eq!(a + b, MinorUnits::from(12_500));
        assert_eq!(a - b, MinorUnits::from(7_500));
        assert_eq!(b * 4, MinorUnits::from(10_000));
        let total: MinorUnits = [a, b, b].into_iter().sum();
        assert_eq!(total, MinorUnits::from(15_000));
    }

    #[test]
    fn processor_string() {
        assert_eq!(MinorUnits::from(10_000).to_processor_string(), "100.00");
        assert_eq!(MinorUnits::from(5).to_processor_string(), "0.05");
        assert_eq!(MinorUnits::from(30_050).to_processor_string(), "300.50");
    }

    #[test]
    fn display() {
        assert_eq!(MinorUnits::from(123_456).to_string(), "1234.56฿");
    }
}
