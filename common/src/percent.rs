//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
use rust_decimal::Decimal;

/// Floating-point percentage in the `[0, 100]` range.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(transparent)
)]
pub struct Percent(Decimal);

impl Percent {
    /// Zero [`Percent`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Full hundred [`Percent`].
    pub const FULL: Self = Self(Decimal::ONE_HUNDRED);

    /// Creates a new [`Percent`] by checking the provided values is
    /// greater than `0` and less than `100`.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Creates a new [`Percent`] clamping the provided value into the
    /// `[0, 100]` range.
    #[must_use]
    pub fn saturating(val: Decimal) -> Self {
        Self(val.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Expresses the `part` as a clamped [`Percent`] of the `whole`.
    ///
    /// Zero is returned if the `whole` is not positive.
    #[must_use]
    pub fn of(part: Decimal, whole: Decimal) -> Self {
        if whole <= Decimal::ZERO {
            return Self::ZERO;
        }
        part.checked_div(whole)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Self::FULL, Self::saturating)
    }

    /// Returns the value of this [`Percent`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}
