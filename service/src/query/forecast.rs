//! [`Forecast`] of the spending of a [`Family`].

use common::{Date, Money};
use itertools::{Itertools as _, MinMaxResult};
use rust_decimal::Decimal;
use serde::Serialize;
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::contract,
    error::{parse_date, ConfigurationError, DateField},
    read::{family::Snapshot, Family},
    Service,
};
#[cfg(doc)]
use crate::domain::{Contract, Payment};

use super::{
    summary::{is_realized, summarize, Summary},
    Query,
};

/// [`Forecast`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Average length of a month in days.
    #[default(Decimal::new(3044, 2))]
    pub average_month_days: Decimal,

    /// Lower bound of the observed months count.
    #[default(Decimal::ONE)]
    pub minimum_observed_months: Decimal,

    /// Deviation from the monthly estimate (in percent) above which the
    /// spending is considered over the estimate.
    #[default(Decimal::TEN)]
    pub deviation_tolerance: Decimal,
}

/// Projection of the spending of a [`Family`] at its current burn rate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    /// Number of months the realized [`Payment`]s span.
    ///
    /// Zero if there are no realized [`Payment`]s tagged with a period.
    pub months_observed: Decimal,

    /// Average realized spending per month.
    pub monthly_burn: Money,

    /// Expected average monthly spending, if any.
    pub estimated_monthly: Option<Money>,

    /// Deviation of the [`Forecast::monthly_burn`] from the
    /// [`Forecast::estimated_monthly`], in percent.
    pub deviation_percent: Decimal,

    /// Indicator whether the [`Forecast::deviation_percent`] exceeds the
    /// configured tolerance.
    pub over_estimate: bool,

    /// Projected [`Runway`] of the remaining value.
    pub runway: Runway,

    /// Indicator whether the remaining value is projected to run out before
    /// the validity does.
    pub at_risk: bool,
}

/// Time until the remaining value of a [`Family`] is exhausted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Runway {
    /// Remaining value doesn't deplete under the current spending.
    Unbounded,

    /// Remaining value depletes in the provided number of days.
    Days(Decimal),
}

impl Runway {
    /// Returns the number of days of this [`Runway`], if it's bounded.
    #[must_use]
    pub const fn days(self) -> Option<Decimal> {
        match self {
            Self::Unbounded => None,
            Self::Days(days) => Some(days),
        }
    }
}

/// Forecasts the spending of the provided [`Family`] out of its [`Summary`].
///
/// Only consuming [`Payment`]s realized as of `today` and tagged with a
/// period end are observed.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if the date or the period end of
/// an observed [`Payment`] is malformed.
pub fn forecast(
    family: &Family<'_>,
    summary: &Summary,
    today: Date,
    config: &Config,
) -> Result<Forecast, Traced<ConfigurationError>> {
    let mut period_ends = Vec::new();
    for (origin, payment) in family.payments() {
        if payment.is_non_consuming
            || !is_realized(origin, payment, today)
                .map_err(tracerr::wrap!())?
        {
            continue;
        }
        if let Some(end) = parse_date(
            &origin.id,
            DateField::PeriodEnd,
            payment.period_end.as_ref(),
        )
        .map_err(tracerr::wrap!())?
        {
            period_ends.push(end);
        }
    }

    let months_observed = match period_ends.into_iter().minmax() {
        MinMaxResult::NoElements => Decimal::ZERO,
        MinMaxResult::OneElement(_) => config.minimum_observed_months,
        MinMaxResult::MinMax(first, last) => Decimal::from(
            last.days_since(first),
        )
        .checked_div(config.average_month_days)
        .map_or(config.minimum_observed_months, |months| {
            months.max(config.minimum_observed_months)
        }),
    };
    let monthly_burn = if months_observed > Decimal::ZERO {
        summary.realized_total / months_observed
    } else {
        Money::ZERO
    };

    let estimated_monthly = family.root().monthly_estimate;
    let deviation_percent = match estimated_monthly {
        Some(estimate)
            if monthly_burn.is_positive() && estimate.is_positive() =>
        {
            monthly_burn.ratio(estimate).map_or(Decimal::ZERO, |r| {
                (r - Decimal::ONE) * Decimal::ONE_HUNDRED
            })
        }
        Some(_) | None => Decimal::ZERO,
    };

    let runway = if monthly_burn.is_positive() {
        summary
            .remaining_value
            .ratio(monthly_burn)
            .and_then(|r| r.checked_mul(config.average_month_days))
            .map_or(Runway::Unbounded, Runway::Days)
    } else {
        Runway::Unbounded
    };
    let at_risk = runway
        .days()
        .is_some_and(|days| days < Decimal::from(summary.remaining_days));

    let forecast = Forecast {
        months_observed,
        monthly_burn,
        estimated_monthly,
        deviation_percent,
        over_estimate: deviation_percent > config.deviation_tolerance,
        runway,
        at_risk,
    };
    log::debug!(
        "forecasted `Contract(id: {})`: burn {} per month, at risk: {}",
        family.root().id,
        forecast.monthly_burn,
        forecast.at_risk,
    );
    Ok(forecast)
}

/// [`Query`] forecasting the spending of the [`Family`] of a root
/// [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct ForecastSpending<'s> {
    /// [`Snapshot`] to read the [`Family`] from.
    pub snapshot: &'s Snapshot<'s>,

    /// ID of the root [`Contract`].
    pub root_id: &'s contract::Id,

    /// Date to forecast as of.
    pub today: Date,
}

impl Query<ForecastSpending<'_>> for Service {
    type Ok = (Summary, Forecast);
    type Err = Traced<ConfigurationError>;

    fn execute(
        &self,
        query: ForecastSpending<'_>,
    ) -> Result<Self::Ok, Self::Err> {
        let family = super::family(query.snapshot, query.root_id)
            .map_err(tracerr::wrap!())?;
        let summary =
            summarize(&family, query.today).map_err(tracerr::wrap!())?;
        let forecast =
            forecast(&family, &summary, query.today, &self.config().forecast)
                .map_err(tracerr::wrap!())?;
        Ok((summary, forecast))
    }
}
