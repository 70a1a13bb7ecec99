//! [`ConsumptionWindow`] of an [`Amendment`].

use common::{Date, Money};
use rust_decimal::Decimal;
use serde::Serialize;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, amendment},
        Contract, Payment,
    },
    error::{
        lenient_signature, parse_date, require_date, ConfigurationError,
        DateField,
    },
    read::{family::Snapshot, Amended, Family},
    Service,
};
#[cfg(doc)]
use crate::domain::Amendment;

use super::{
    status::{classify, Status},
    summary::{aggregate_end_date, aggregate_value},
    Query,
};

/// Payment window of an [`Amendment`], if it has one.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "availability")]
pub enum Window<'a> {
    /// [`Amendment`] has a [`ConsumptionWindow`].
    Available(ConsumptionWindow<'a>),

    /// [`Amendment`] of this [`amendment::Kind`] has no payment window
    /// concept.
    Unavailable {
        /// [`amendment::Kind`] of the [`Amendment`].
        kind: amendment::Kind,

        /// Human-readable reason.
        reason: &'static str,
    },
}

impl<'a> Window<'a> {
    /// Returns the [`ConsumptionWindow`], if it's available.
    #[must_use]
    pub fn available(self) -> Option<ConsumptionWindow<'a>> {
        match self {
            Self::Available(window) => Some(window),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Reason of a [`Window::Unavailable`].
pub const NO_WINDOW: &str = "no payment window concept";

/// Date range of a [`Family`] validity attributed to a single record, along
/// with the root [`Payment`]s whose period ends within it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionWindow<'a> {
    /// ID of the [`Contract`] record this window is attributed to.
    pub contract_id: &'a contract::Id,

    /// First day of this window.
    pub start: Date,

    /// Last day of this window.
    pub end: Date,

    /// [`Payment`]s of the root [`Contract`] whose period ends within this
    /// window, in their registration order.
    pub payments: Vec<&'a Payment>,

    /// Sum of the consuming [`ConsumptionWindow::payments`].
    pub regular_total: Money,

    /// Sum of the non-consuming [`ConsumptionWindow::payments`].
    pub non_consuming_total: Money,

    /// Value the [`ConsumptionWindow::regular_total`] is measured against.
    pub reference_value: Money,

    /// Share of the [`ConsumptionWindow::reference_value`] consumed, in
    /// percent.
    ///
    /// Not clamped, so goes above `100` once the window is over-consumed.
    pub consumption_percent: Decimal,

    /// Lifecycle [`Status`] of this window.
    pub status: Status,
}

/// Calculates the payment [`Window`] of the [`Amendment`] with the provided
/// ID in the provided [`Family`].
///
/// A term [`Amendment`] spans from the day after its predecessor (in the
/// chain of the root and term [`Amendment`]s sorted by end date) till its own
/// end. A value [`Amendment`] spans from its signature till the aggregate
/// end of the [`Family`].
///
/// # Errors
///
/// - [`ConfigurationError::AmendmentNotInFamily`] if there is no such
///   [`Amendment`] in the [`Family`].
/// - [`ConfigurationError::NoPredecessor`] if a term [`Amendment`] doesn't
///   end strictly after its predecessor in its chain.
/// - [`ConfigurationError::InvalidDate`] if any date involved is absent or
///   malformed.
pub fn window_for<'a>(
    family: &Family<'a>,
    amendment_id: &contract::Id,
    today: Date,
) -> Result<Window<'a>, Traced<ConfigurationError>> {
    let target = family.amendment(amendment_id).ok_or_else(|| {
        tracerr::new!(ConfigurationError::AmendmentNotInFamily {
            root: family.root().id.clone(),
            amendment: amendment_id.clone(),
        })
    })?;

    let (start, end) = match target.amendment.kind {
        amendment::Kind::Term => {
            term_bounds(family, target).map_err(tracerr::wrap!())?
        }
        amendment::Kind::Value => {
            let start = require_date(
                &target.contract.id,
                DateField::AmendmentSignature,
                Some(&target.amendment.signature_date),
            )
            .map_err(tracerr::wrap!())?;
            let end = aggregate_end_date(family).map_err(tracerr::wrap!())?;
            (start, end)
        }
        kind @ (amendment::Kind::ManagerInspector | amendment::Kind::Other) => {
            return Ok(Window::Unavailable {
                kind,
                reason: NO_WINDOW,
            });
        }
    };

    let reference_value = if target.contract.value.is_positive() {
        target.contract.value
    } else {
        aggregate_value(family)
    };
    let signature = lenient_signature(
        &target.contract.id,
        DateField::AmendmentSignature,
        Some(&target.amendment.signature_date),
    );

    collect(
        family,
        target.contract,
        (start, end),
        reference_value,
        classify(signature, start, end, today),
    )
    .map(Window::Available)
    .map_err(tracerr::wrap!())
}

/// Calculates the [`ConsumptionWindow`] of the root [`Contract`] of the
/// provided [`Family`] on its own: from its start till its own end.
///
/// Along with the windows of all its term [`Amendment`]s, it tiles the whole
/// validity of the [`Family`].
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if any date involved is absent or
/// malformed.
pub fn base_window<'a>(
    family: &Family<'a>,
    today: Date,
) -> Result<ConsumptionWindow<'a>, Traced<ConfigurationError>> {
    let root = family.root();
    let start =
        require_date(&root.id, DateField::Start, root.start_date.as_ref())
            .map_err(tracerr::wrap!())?;
    let end = require_date(&root.id, DateField::End, root.end_date.as_ref())
        .map_err(tracerr::wrap!())?;
    let signature = lenient_signature(
        &root.id,
        DateField::Signature,
        root.signature_date.as_ref(),
    );

    collect(
        family,
        root,
        (start, end),
        root.value,
        classify(signature, start, end, today),
    )
    .map_err(tracerr::wrap!())
}

/// Locates the bounds of the provided term [`Amendment`] in its chain.
fn term_bounds(
    family: &Family<'_>,
    target: Amended<'_>,
) -> Result<(Date, Date), Traced<ConfigurationError>> {
    let root = family.root();
    let mut chain = vec![(
        &root.id,
        require_date(&root.id, DateField::End, root.end_date.as_ref())
            .map_err(tracerr::wrap!())?,
    )];
    for a in family.amendments_of(amendment::Kind::Term) {
        let end = require_date(
            &a.contract.id,
            DateField::End,
            a.contract.end_date.as_ref(),
        )
        .map_err(tracerr::wrap!())?;
        chain.push((&a.contract.id, end));
    }
    chain.sort_by_key(|(_, end)| *end);

    let index = chain
        .iter()
        .position(|(id, _)| *id == &target.contract.id)
        .ok_or_else(|| {
            tracerr::new!(ConfigurationError::AmendmentNotInFamily {
                root: root.id.clone(),
                amendment: target.contract.id.clone(),
            })
        })?;
    let end = chain[index].1;
    let Some(&(predecessor_id, predecessor_end)) = index
        .checked_sub(1)
        .and_then(|i| chain.get(i))
        .filter(|(_, predecessor_end)| *predecessor_end < end)
    else {
        return Err(tracerr::new!(ConfigurationError::NoPredecessor(
            target.contract.id.clone()
        )));
    };
    let start = predecessor_end.next_day().ok_or_else(|| {
        tracerr::new!(ConfigurationError::InvalidDate {
            contract: predecessor_id.clone(),
            field: DateField::End,
            value: predecessor_end.into(),
        })
    })?;
    Ok((start, end))
}

/// Collects the [`Payment`]s of the root [`Contract`] of the provided
/// [`Family`] whose period ends within the provided bounds into a
/// [`ConsumptionWindow`].
///
/// [`Payment`]s registered on amendments don't count towards any window.
fn collect<'a>(
    family: &Family<'a>,
    owner: &'a Contract,
    (start, end): (Date, Date),
    reference_value: Money,
    status: Status,
) -> Result<ConsumptionWindow<'a>, Traced<ConfigurationError>> {
    let mut payments = Vec::new();
    let mut regular_total = Money::ZERO;
    let mut non_consuming_total = Money::ZERO;
    let root = family.root();
    for payment in &root.payments {
        let Some(period_end) = parse_date(
            &root.id,
            DateField::PeriodEnd,
            payment.period_end.as_ref(),
        )
        .map_err(tracerr::wrap!())?
        else {
            continue;
        };
        if period_end < start || period_end > end {
            continue;
        }
        if payment.is_non_consuming {
            non_consuming_total += payment.amount_paid;
        } else {
            regular_total += payment.amount_paid;
        }
        payments.push(payment);
    }

    let consumption_percent = regular_total
        .ratio(reference_value)
        .map_or(Decimal::ZERO, |r| r * Decimal::ONE_HUNDRED);

    log::debug!(
        "window of `Contract(id: {})` is [{start}, {end}] with {} payments",
        owner.id,
        payments.len(),
    );
    Ok(ConsumptionWindow {
        contract_id: &owner.id,
        start,
        end,
        payments,
        regular_total,
        non_consuming_total,
        reference_value,
        consumption_percent,
        status,
    })
}

/// [`Query`] calculating the payment [`Window`] of an [`Amendment`].
#[derive(Clone, Copy, Debug)]
pub struct WindowFor<'s> {
    /// [`Snapshot`] to read the [`Family`] from.
    pub snapshot: &'s Snapshot<'s>,

    /// ID of the [`Amendment`].
    pub amendment_id: &'s contract::Id,

    /// Date to calculate the [`Window`] as of.
    pub today: Date,
}

impl<'s> Query<WindowFor<'s>> for Service {
    type Ok = Window<'s>;
    type Err = Traced<ConfigurationError>;

    fn execute(&self, query: WindowFor<'s>) -> Result<Self::Ok, Self::Err> {
        let snapshot = query.snapshot;
        let contract = snapshot.contract(query.amendment_id).ok_or_else(|| {
            tracerr::new!(ConfigurationError::RootNotExists(
                query.amendment_id.clone()
            ))
        })?;
        let root_id = contract.parent_id().unwrap_or(&contract.id);
        let family =
            super::family(snapshot, root_id).map_err(tracerr::wrap!())?;
        window_for(&family, query.amendment_id, query.today)
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] calculating the [`base_window()`] followed by the [`Window`]s
/// of all the term [`Amendment`]s of a root [`Contract`], in chain order.
#[derive(Clone, Copy, Debug)]
pub struct Windows<'s> {
    /// [`Snapshot`] to read the [`Family`] from.
    pub snapshot: &'s Snapshot<'s>,

    /// ID of the root [`Contract`].
    pub root_id: &'s contract::Id,

    /// Date to calculate the windows as of.
    pub today: Date,
}

impl<'s> Query<Windows<'s>> for Service {
    type Ok = Vec<ConsumptionWindow<'s>>;
    type Err = Traced<ConfigurationError>;

    fn execute(&self, query: Windows<'s>) -> Result<Self::Ok, Self::Err> {
        let family = super::family(query.snapshot, query.root_id)
            .map_err(tracerr::wrap!())?;
        let mut windows =
            vec![base_window(&family, query.today).map_err(tracerr::wrap!())?];
        for a in family.amendments_of(amendment::Kind::Term) {
            if let Some(w) = window_for(&family, &a.contract.id, query.today)
                .map_err(tracerr::wrap!())?
                .available()
            {
                windows.push(w);
            }
        }
        windows.sort_by_key(|w| w.end);
        Ok(windows)
    }
}
