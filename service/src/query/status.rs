//! Temporal [`Status`] classification.

use common::Date;
use serde::Serialize;
use strum::{Display, EnumString};

#[cfg(doc)]
use crate::domain::Contract;

/// Lifecycle status of a [`Contract`] relative to "today".
///
/// Never stored: recomputed from the current dates on every call.
#[derive(
    Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Not signed yet.
    Forming,

    /// Signed, but its validity hasn't started yet.
    Upcoming,

    /// Within its validity.
    Active,

    /// Its validity is over.
    Expired,
}

/// Classifies the [`Status`] of a [`Contract`] with the provided dates.
///
/// The first matching rule wins:
/// 1. signed after `today` is [`Status::Forming`];
/// 2. starting after `today` is [`Status::Upcoming`];
/// 3. ended before `today` is [`Status::Expired`];
/// 4. otherwise it's [`Status::Active`].
///
/// An absent `signature` skips the first rule.
#[must_use]
pub fn classify(
    signature: Option<Date>,
    start: Date,
    end: Date,
    today: Date,
) -> Status {
    if signature.is_some_and(|s| s > today) {
        Status::Forming
    } else if start > today {
        Status::Upcoming
    } else if end < today {
        Status::Expired
    } else {
        Status::Active
    }
}
