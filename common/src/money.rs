//! [`Money`]-related definitions.

use std::{fmt, ops, str::FromStr};

use derive_more::{Add, AddAssign, From, Into, Sub, SubAssign, Sum};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Amount of money in the currency of a contract.
///
/// May be negative: a remaining balance goes below zero once the realized
/// spending exceeds the contracted value.
#[derive(
    Add,
    AddAssign,
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Sub,
    SubAssign,
    Sum,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// Zero [`Money`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] of the provided `amount`.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the amount of this [`Money`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Money`] is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Divides this [`Money`] by the `whole` one.
    ///
    /// [`None`] is returned if the `whole` is zero.
    #[must_use]
    pub fn ratio(self, whole: Self) -> Option<Decimal> {
        self.0.checked_div(whole.0)
    }
}

impl ops::Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl ops::Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.is_integer().then(|| self.0.to_i128()).flatten() {
            Some(int) => write!(f, "{int}"),
            None => write!(f, "{}", self.0.normalize()),
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| "invalid amount")
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::Money;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45").unwrap(),
            Money::new(decimal("123.45")),
        );
        assert_eq!(
            Money::from_str(" -10 ").unwrap(),
            Money::new(decimal("-10")),
        );

        assert!(Money::from_str("").is_err());
        assert!(Money::from_str("12,50").is_err());
        assert!(Money::from_str("R$ 10").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Money::new(decimal("123.45")).to_string(), "123.45");
        assert_eq!(Money::new(decimal("123.00")).to_string(), "123");
        assert_eq!(Money::new(decimal("123.50")).to_string(), "123.5");
        assert_eq!(Money::new(decimal("-7")).to_string(), "-7");
    }

    #[test]
    fn arithmetic() {
        let total = [decimal("10.10"), decimal("0.90"), decimal("4")]
            .into_iter()
            .map(Money::new)
            .sum::<Money>();
        assert_eq!(total, Money::new(decimal("15")));

        assert_eq!(
            Money::new(decimal("100")) - Money::new(decimal("120")),
            Money::new(decimal("-20")),
        );
        assert_eq!(
            Money::new(decimal("90")) / decimal("3"),
            Money::new(decimal("30")),
        );
    }

    #[test]
    fn ratio() {
        assert_eq!(
            Money::new(decimal("25")).ratio(Money::new(decimal("100"))),
            Some(decimal("0.25")),
        );
        assert_eq!(Money::new(decimal("25")).ratio(Money::ZERO), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_numbers_and_strings() {
        let money: Vec<Money> =
            serde_json::from_str(r#"[1500.5, 200, "12.34"]"#).unwrap();
        assert_eq!(
            money,
            [
                Money::new(decimal("1500.5")),
                Money::new(decimal("200")),
                Money::new(decimal("12.34")),
            ],
        );
    }
}
