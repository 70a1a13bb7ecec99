//! [`Summary`] aggregation of a [`Family`].

use common::{Date, Money, Percent};
use rust_decimal::Decimal;
use serde::Serialize;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, Contract, Payment},
    error::{
        lenient_signature, parse_date, require_date, ConfigurationError,
        DateField,
    },
    read::{family::Snapshot, Family},
    Service,
};

use super::{
    status::{classify, Status},
    Query,
};

/// Aggregated state of a [`Family`] as of "today".
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// ID of the root [`Contract`].
    pub root_id: contract::Id,

    /// Root value plus the values of value-contributing amendments.
    pub aggregate_value: Money,

    /// Start of the root [`Contract`] validity.
    pub start_date: Date,

    /// Latest end date among the root and its term amendments.
    pub aggregate_end_date: Date,

    /// Sum of consuming [`Payment`]s dated on or before "today".
    pub realized_total: Money,

    /// Sum of consuming [`Payment`]s dated after "today".
    pub scheduled_total: Money,

    /// Sum of non-consuming [`Payment`]s, whatever their date is.
    pub non_consuming_total: Money,

    /// [`Summary::aggregate_value`] minus [`Summary::realized_total`].
    ///
    /// Negative once the [`Family`] is over-consumed.
    pub remaining_value: Money,

    /// Days of validity, both ends inclusive.
    pub total_days: i64,

    /// Days of validity elapsed as of "today".
    pub elapsed_days: i64,

    /// Days of validity left as of "today".
    pub remaining_days: i64,

    /// Share of the [`Summary::aggregate_value`] realized.
    pub percent_value_consumed: Percent,

    /// Share of the [`Summary::total_days`] elapsed.
    pub percent_time_elapsed: Percent,

    /// Lifecycle [`Status`] of the [`Family`].
    pub status: Status,
}

/// Summarizes the provided [`Family`] as of `today`.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if the start date, any end date
/// contributing to the aggregate one, or the date of any consuming
/// [`Payment`] is absent or malformed.
pub fn summarize(
    family: &Family<'_>,
    today: Date,
) -> Result<Summary, Traced<ConfigurationError>> {
    let root = family.root();

    let aggregate_value = aggregate_value(family);
    let start_date =
        require_date(&root.id, DateField::Start, root.start_date.as_ref())
            .map_err(tracerr::wrap!())?;
    let aggregate_end_date =
        aggregate_end_date(family).map_err(tracerr::wrap!())?;
    let signature = lenient_signature(
        &root.id,
        DateField::Signature,
        root.signature_date.as_ref(),
    );

    let mut realized_total = Money::ZERO;
    let mut scheduled_total = Money::ZERO;
    let mut non_consuming_total = Money::ZERO;
    for (origin, payment) in family.payments() {
        if payment.is_non_consuming {
            non_consuming_total += payment.amount_paid;
        } else if is_realized(origin, payment, today)
            .map_err(tracerr::wrap!())?
        {
            realized_total += payment.amount_paid;
        } else {
            scheduled_total += payment.amount_paid;
        }
    }
    let remaining_value = aggregate_value - realized_total;

    let total_days = aggregate_end_date.days_since(start_date) + 1;
    let elapsed_days = if today < start_date {
        0
    } else if today > aggregate_end_date {
        total_days
    } else {
        today.days_since(start_date) + 1
    };
    let remaining_days = total_days - elapsed_days;

    let summary = Summary {
        root_id: root.id.clone(),
        aggregate_value,
        start_date,
        aggregate_end_date,
        realized_total,
        scheduled_total,
        non_consuming_total,
        remaining_value,
        total_days,
        elapsed_days,
        remaining_days,
        percent_value_consumed: Percent::of(
            realized_total.amount(),
            aggregate_value.amount(),
        ),
        percent_time_elapsed: Percent::of(
            Decimal::from(elapsed_days),
            Decimal::from(total_days),
        ),
        status: classify(signature, start_date, aggregate_end_date, today),
    };
    log::debug!(
        "summarized `Contract(id: {})`: {} of {} realized, status {}",
        root.id,
        summary.realized_total,
        summary.aggregate_value,
        summary.status,
    );
    Ok(summary)
}

/// Returns the root value plus the values of all the value-contributing
/// amendments of the provided [`Family`].
pub(crate) fn aggregate_value(family: &Family<'_>) -> Money {
    family.root().value
        + family
            .amendments()
            .iter()
            .filter(|a| a.amendment.kind.contributes_value())
            .map(|a| a.contract.value)
            .sum::<Money>()
}

/// Returns the latest end date among the root [`Contract`] of the provided
/// [`Family`] and its term amendments.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if any of these end dates is
/// absent or malformed.
pub(crate) fn aggregate_end_date(
    family: &Family<'_>,
) -> Result<Date, Traced<ConfigurationError>> {
    let root = family.root();
    let mut end = require_date(&root.id, DateField::End, root.end_date.as_ref())
        .map_err(tracerr::wrap!())?;
    for a in family.amendments() {
        if !a.amendment.kind.extends_term() {
            continue;
        }
        let term_end = require_date(
            &a.contract.id,
            DateField::End,
            a.contract.end_date.as_ref(),
        )
        .map_err(tracerr::wrap!())?;
        end = end.max(term_end);
    }
    Ok(end)
}

/// Indicates whether the provided [`Payment`] registered on the `origin`
/// [`Contract`] is realized as of `today`, rather than scheduled.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if the [`Payment`] date is absent
/// or malformed.
pub(crate) fn is_realized(
    origin: &Contract,
    payment: &Payment,
    today: Date,
) -> Result<bool, Traced<ConfigurationError>> {
    require_date(&origin.id, DateField::PaymentDate, Some(&payment.date))
        .map(|date| date <= today)
        .map_err(tracerr::wrap!())
}

/// [`Query`] summarizing the [`Family`] of a root [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct Summarize<'s> {
    /// [`Snapshot`] to read the [`Family`] from.
    pub snapshot: &'s Snapshot<'s>,

    /// ID of the root [`Contract`].
    pub root_id: &'s contract::Id,

    /// Date to summarize as of.
    pub today: Date,
}

impl Query<Summarize<'_>> for Service {
    type Ok = Summary;
    type Err = Traced<ConfigurationError>;

    fn execute(&self, query: Summarize<'_>) -> Result<Self::Ok, Self::Err> {
        let family = super::family(query.snapshot, query.root_id)
            .map_err(tracerr::wrap!())?;
        summarize(&family, query.today).map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{Date, Money, Percent, RawDate};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            contract::{amendment, Details, Role, Root},
            payment::{self, Payment},
            Amendment, Contract,
        },
        error::{ConfigurationError, DateField},
        read::family::resolve_family,
        query::status::Status,
    };

    use super::summarize;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        Money::new(decimal(s))
    }

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn payment(date: &str, amount: &str, non_consuming: bool) -> Payment {
        Payment {
            id: payment::Id::new(),
            date: RawDate::new(date),
            amount_paid: money(amount),
            invoice_number: String::new(),
            process_number: String::new(),
            process_link: None,
            period_start: None,
            period_end: None,
            is_non_consuming: non_consuming,
            line_items: vec![],
        }
    }

    fn root(value: &str, payments: Vec<Payment>) -> Contract {
        Contract {
            id: "r".into(),
            contracting_unit: None,
            contractor: None,
            value: money(value),
            start_date: Some(RawDate::new("2024-01-01")),
            end_date: Some(RawDate::new("2024-12-31")),
            signature_date: Some(RawDate::new("2023-12-20")),
            monthly_estimate: None,
            payments,
            details: Details::default(),
            role: Role::Root(Root::default()),
        }
    }

    fn amendment(
        id: &str,
        kind: amendment::Kind,
        value: &str,
        end: Option<&str>,
    ) -> Contract {
        Contract {
            id: id.into(),
            value: money(value),
            start_date: None,
            end_date: end.map(RawDate::new),
            signature_date: None,
            role: Role::Amendment(Amendment {
                parent_id: "r".into(),
                kind,
                number: String::new(),
                process_number: String::new(),
                process_link: None,
                justification: String::new(),
                signature_date: RawDate::new("2024-06-01"),
                manager: None,
                inspectors: None,
            }),
            ..root("0", vec![])
        }
    }

    #[test]
    fn aggregates_value_and_end_per_kind() {
        let contracts = vec![
            root("100000", vec![]),
            amendment("v", amendment::Kind::Value, "20000", None),
            amendment("t", amendment::Kind::Term, "5000", Some("2025-06-30")),
            amendment("g", amendment::Kind::ManagerInspector, "999", None),
            amendment("o", amendment::Kind::Other, "1", Some("2030-01-01")),
        ];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let s = summarize(&family, date("2024-06-15")).unwrap();

        assert_eq!(s.aggregate_value, money("125000"));
        assert_eq!(s.aggregate_end_date, date("2025-06-30"));
        assert_eq!(s.status, Status::Active);
    }

    #[test]
    fn splits_payments() {
        let contracts = vec![
            root(
                "1000",
                vec![
                    payment("2024-02-01", "100", false),
                    payment("2024-03-01", "50", true),
                    payment("2024-03-02", "70", false),
                ],
            ),
            Contract {
                payments: vec![payment("2024-02-10", "30", false)],
                ..amendment("v", amendment::Kind::Value, "0", None)
            },
        ];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let s = summarize(&family, date("2024-03-01")).unwrap();

        assert_eq!(s.realized_total, money("130"));
        assert_eq!(s.scheduled_total, money("70"));
        assert_eq!(s.non_consuming_total, money("50"));
        assert_eq!(s.remaining_value, money("870"));
        assert_eq!(s.percent_value_consumed, Percent::new(decimal("13")).unwrap());
    }

    #[test]
    fn remaining_value_goes_negative_but_percent_is_clamped() {
        let contracts =
            vec![root("100", vec![payment("2024-02-01", "150", false)])];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let s = summarize(&family, date("2024-03-01")).unwrap();

        assert_eq!(s.remaining_value, money("-50"));
        assert_eq!(s.percent_value_consumed, Percent::FULL);
    }

    #[test]
    fn counts_days_inclusively() {
        let contracts = vec![root("100", vec![])];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let before = summarize(&family, date("2023-12-25")).unwrap();
        assert_eq!(before.total_days, 366);
        assert_eq!(before.elapsed_days, 0);
        assert_eq!(before.remaining_days, 366);
        assert_eq!(before.percent_time_elapsed, Percent::ZERO);
        assert_eq!(before.status, Status::Upcoming);

        let first = summarize(&family, date("2024-01-01")).unwrap();
        assert_eq!(first.elapsed_days, 1);
        assert_eq!(first.remaining_days, 365);

        let after = summarize(&family, date("2025-02-01")).unwrap();
        assert_eq!(after.elapsed_days, 366);
        assert_eq!(after.remaining_days, 0);
        assert_eq!(after.percent_time_elapsed, Percent::FULL);
        assert_eq!(after.status, Status::Expired);
    }

    #[test]
    fn zero_value_consumes_nothing() {
        let contracts = vec![root("0", vec![payment("2024-02-01", "10", false)])];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let s = summarize(&family, date("2024-03-01")).unwrap();

        assert_eq!(s.percent_value_consumed, Percent::ZERO);
    }

    #[test]
    fn is_idempotent() {
        let contracts = vec![
            root("1000", vec![payment("2024-02-01", "100", false)]),
            amendment("t", amendment::Kind::Term, "10", Some("2025-01-31")),
        ];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        assert_eq!(
            summarize(&family, date("2024-05-05")).unwrap(),
            summarize(&family, date("2024-05-05")).unwrap(),
        );
    }

    #[test]
    fn reports_malformed_dates() {
        let mut bad_start = root("100", vec![]);
        bad_start.start_date = Some(RawDate::new("2024-13-01"));
        let contracts = vec![bad_start];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let err = summarize(&family, date("2024-03-01")).unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ConfigurationError::InvalidDate {
                field: DateField::Start,
                ..
            },
        ));

        let contracts = vec![
            root("100", vec![]),
            amendment("t", amendment::Kind::Term, "0", None),
        ];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let err = summarize(&family, date("2024-03-01")).unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ConfigurationError::InvalidDate {
                contract,
                field: DateField::End,
                ..
            } if contract.as_ref() == "t",
        ));
    }

    #[test]
    fn malformed_signature_only_skips_forming() {
        let mut bad_signature = root("100", vec![]);
        bad_signature.signature_date = Some(RawDate::new("2099-99-99"));
        let contracts = vec![bad_signature];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let s = summarize(&family, date("2024-03-01")).unwrap();

        assert_eq!(s.status, Status::Active);
        assert_eq!(s.total_days, 366);
    }

    #[test]
    fn ignores_dates_of_non_consuming_payments() {
        let contracts = vec![root("100", vec![payment("", "10", true)])];
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let s = summarize(&family, date("2024-03-01")).unwrap();

        assert_eq!(s.non_consuming_total, money("10"));
    }
}
