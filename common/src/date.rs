//! Calendar date utilities.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error, From};
use time::macros::format_description;

/// Calendar date without a time component, formatted as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components do not form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the day following this [`Date`].
    ///
    /// [`None`] is returned on the calendar overflow.
    #[must_use]
    pub fn next_day(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Returns the number of whole days elapsed from the `earlier` [`Date`]
    /// to this one.
    ///
    /// Negative if the `earlier` [`Date`] is actually later.
    #[must_use]
    pub fn days_since(self, earlier: Self) -> i64 {
        (self.0 - earlier.0).whole_days()
    }

    /// Returns the calendar year of this [`Date`].
    #[must_use]
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// Returns the calendar month of this [`Date`] in the `1..=12` range.
    #[must_use]
    pub fn month(self) -> u8 {
        u8::from(self.0.month())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self
            .0
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl FromStr for Date {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(
            s.trim(),
            format_description!("[year]-[month]-[day]"),
        )
        .map(Self)
        .map_err(ParseError)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid calendar date: {_0}")]
pub struct ParseError(time::error::Parse);

/// Date as it is persisted: arbitrary text that is expected to hold a
/// `YYYY-MM-DD` [`Date`], but may be blank or malformed.
///
/// The text is kept verbatim, so it survives a load/save cycle untouched, and
/// is only interpreted via [`RawDate::parse()`].
#[derive(Clone, Debug, Default, Display, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct RawDate(String);

impl RawDate {
    /// Creates a new [`RawDate`] out of the provided text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the text of this [`RawDate`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Indicates whether this [`RawDate`] holds no text at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Interprets this [`RawDate`] as a [`Date`].
    ///
    /// [`None`] is returned for a blank [`RawDate`].
    ///
    /// # Errors
    ///
    /// If the text is not blank and is not a valid `YYYY-MM-DD` [`Date`].
    pub fn parse(&self) -> Result<Option<Date>, ParseError> {
        if self.is_blank() {
            return Ok(None);
        }
        self.0.parse().map(Some)
    }
}

impl From<Date> for RawDate {
    fn from(date: Date) -> Self {
        Self(date.to_string())
    }
}

#[cfg(feature = "serde")]
mod serialization {
    //! Module providing integration with [`serde`] crate.

    use std::str::FromStr as _;

    use serde::{
        de::Error as _, Deserialize, Deserializer, Serialize, Serializer,
    };

    use super::Date;

    impl Serialize for Date {
        fn serialize<S: Serializer>(
            &self,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    impl<'de> Deserialize<'de> for Date {
        fn deserialize<D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Date::from_str(&s).map_err(D::Error::custom)
        }
    }
}
