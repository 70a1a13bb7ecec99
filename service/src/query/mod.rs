//! [`Query`] definition.

pub mod forecast;
pub mod payments;
pub mod personnel;
pub mod status;
pub mod summary;
pub mod window;

use tracerr::Traced;

use crate::{
    domain::contract,
    error::ConfigurationError,
    read::{family::Snapshot, Family},
};
#[cfg(doc)]
use crate::domain::Contract;

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;

pub use self::{
    forecast::{forecast, Forecast, ForecastSpending, Runway},
    payments::{
        competency, item_consumption, payment_history, yearly_totals,
        Payments,
    },
    personnel::{effective_personnel, EffectivePersonnel, Personnel},
    status::{classify, Status},
    summary::{summarize, Summarize, Summary},
    window::{
        base_window, window_for, ConsumptionWindow, Window, WindowFor,
        Windows,
    },
};

/// Resolves the [`Family`] of the root [`Contract`] with the provided ID.
///
/// # Errors
///
/// With [`ConfigurationError::RootNotExists`] if there is no such root
/// [`Contract`] in the [`Snapshot`].
pub(crate) fn family<'a>(
    snapshot: &Snapshot<'a>,
    root_id: &contract::Id,
) -> Result<Family<'a>, Traced<ConfigurationError>> {
    snapshot.family(root_id).ok_or_else(|| {
        tracerr::new!(ConfigurationError::RootNotExists(root_id.clone()))
    })
}
