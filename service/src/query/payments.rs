//! [`Payment`] history and analytics of a [`Family`].

use std::collections::BTreeMap;

use common::{Date, Money, Percent};
use itertools::Itertools as _;
use serde::Serialize;
use tracerr::Traced;

use crate::{
    domain::{contract, Payment},
    error::{parse_date, ConfigurationError, DateField},
    read::{family::Snapshot, Family},
    Service,
};

#[cfg(doc)]
use crate::domain::Contract;

use super::Query;

/// [`Payment`] along with the [`Contract`] record it was registered on.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<'a> {
    /// ID of the [`Contract`] record the [`Payment`] was registered on.
    pub origin: &'a contract::Id,

    /// Indicator whether the [`HistoryEntry::origin`] is an amendment.
    pub from_amendment: bool,

    /// [`Payment`] itself.
    pub payment: &'a Payment,
}

/// Returns every [`Payment`] of the provided [`Family`], non-consuming ones
/// included.
///
/// [`Payment`]s are ordered by their period start, the ones without it going
/// last. Ties are ordered by the [`Payment`] date.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if any [`Payment`] date or
/// period start is malformed.
pub fn payment_history<'a>(
    family: &Family<'a>,
) -> Result<Vec<HistoryEntry<'a>>, Traced<ConfigurationError>> {
    let mut entries = Vec::new();
    for (origin, payment) in family.payments() {
        let period_start = parse_date(
            &origin.id,
            DateField::PeriodStart,
            payment.period_start.as_ref(),
        )
        .map_err(tracerr::wrap!())?;
        let date =
            parse_date(&origin.id, DateField::PaymentDate, Some(&payment.date))
                .map_err(tracerr::wrap!())?;
        entries.push((
            (period_start.is_none(), period_start, date),
            HistoryEntry {
                origin: &origin.id,
                from_amendment: !origin.is_root(),
                payment,
            },
        ));
    }
    Ok(entries
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
        .map(|(_, e)| e)
        .collect())
}

/// Returns the totals of consuming [`Payment`]s of the provided [`Family`]
/// grouped by the year of their period end.
///
/// [`Payment`]s without a period end or a positive amount are left out.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if any period end is malformed.
pub fn yearly_totals(
    family: &Family<'_>,
) -> Result<BTreeMap<i32, Money>, Traced<ConfigurationError>> {
    let mut totals = BTreeMap::<_, Money>::new();
    for (payment, period_end) in
        consuming(family).map_err(tracerr::wrap!())?
    {
        if payment.amount_paid.is_positive() {
            *totals.entry(period_end.year()).or_default() +=
                payment.amount_paid;
        }
    }
    Ok(totals)
}

/// Consumption of a single billed item across a [`Family`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemConsumption {
    /// Trimmed description of the item, empty if it has none.
    pub description: String,

    /// Total billed for the item.
    pub total: Money,

    /// Share of the item in the total billed for all the items.
    pub share: Percent,
}

/// Groups the line items of consuming [`Payment`]s of the provided
/// [`Family`] by their description, ordered by total descending.
#[must_use]
pub fn item_consumption(family: &Family<'_>) -> Vec<ItemConsumption> {
    let mut totals = BTreeMap::<_, Money>::new();
    for (_, payment) in family.payments() {
        if payment.is_non_consuming {
            continue;
        }
        for item in &payment.line_items {
            *totals.entry(item.description.trim()).or_default() +=
                item.total();
        }
    }
    let overall = totals.values().copied().sum::<Money>();

    totals
        .into_iter()
        .map(|(description, total)| ItemConsumption {
            description: description.to_owned(),
            total,
            share: Percent::of(total.amount(), overall.amount()),
        })
        .sorted_by(|a, b| b.total.cmp(&a.total))
        .collect()
}

/// Monthly line item totals of a [`Family`] within a single year.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Competency {
    /// Year of this [`Competency`].
    pub year: i32,

    /// Totals by item description for each month, January first.
    pub months: [BTreeMap<String, Money>; 12],
}

impl Competency {
    /// Returns the total of all the items in the provided month (`1..=12`).
    #[must_use]
    pub fn month_total(&self, month: u8) -> Money {
        usize::from(month)
            .checked_sub(1)
            .and_then(|i| self.months.get(i))
            .map(|items| items.values().copied().sum())
            .unwrap_or_default()
    }
}

/// Builds the [`Competency`] of the provided [`Family`] in the provided
/// year, accounting line items of consuming [`Payment`]s to the month of
/// their period end.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if any period end is malformed.
pub fn competency(
    family: &Family<'_>,
    year: i32,
) -> Result<Competency, Traced<ConfigurationError>> {
    let mut months: [BTreeMap<String, Money>; 12] = Default::default();
    for (payment, period_end) in
        consuming(family).map_err(tracerr::wrap!())?
    {
        if period_end.year() != year {
            continue;
        }
        let Some(month) = usize::from(period_end.month())
            .checked_sub(1)
            .and_then(|i| months.get_mut(i))
        else {
            continue;
        };
        for item in &payment.line_items {
            *month
                .entry(item.description.trim().to_owned())
                .or_default() += item.total();
        }
    }
    Ok(Competency { year, months })
}

/// Collects consuming [`Payment`]s of the provided [`Family`] tagged with a
/// period end.
fn consuming<'a>(
    family: &Family<'a>,
) -> Result<Vec<(&'a Payment, Date)>, Traced<ConfigurationError>> {
    let mut out = Vec::new();
    for (origin, payment) in family.payments() {
        if payment.is_non_consuming {
            continue;
        }
        if let Some(end) = parse_date(
            &origin.id,
            DateField::PeriodEnd,
            payment.period_end.as_ref(),
        )
        .map_err(tracerr::wrap!())?
        {
            out.push((payment, end));
        }
    }
    Ok(out)
}

/// Report of the [`Payment`]s of a [`Family`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReport<'a> {
    /// Full [`payment_history()`].
    pub history: Vec<HistoryEntry<'a>>,

    /// [`yearly_totals()`].
    pub yearly_totals: BTreeMap<i32, Money>,

    /// [`item_consumption()`].
    pub items: Vec<ItemConsumption>,

    /// [`competency()`] of the requested year, if any.
    pub competency: Option<Competency>,
}

/// [`Query`] reporting the [`Payment`]s of the [`Family`] of a root
/// [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct Payments<'s> {
    /// [`Snapshot`] to read the [`Family`] from.
    pub snapshot: &'s Snapshot<'s>,

    /// ID of the root [`Contract`].
    pub root_id: &'s contract::Id,

    /// Year to build the [`Competency`] for.
    pub year: Option<i32>,
}

impl<'s> Query<Payments<'s>> for Service {
    type Ok = PaymentReport<'s>;
    type Err = Traced<ConfigurationError>;

    fn execute(&self, query: Payments<'s>) -> Result<Self::Ok, Self::Err> {
        let family = super::family(query.snapshot, query.root_id)
            .map_err(tracerr::wrap!())?;
        Ok(PaymentReport {
            history: payment_history(&family).map_err(tracerr::wrap!())?,
            yearly_totals: yearly_totals(&family).map_err(tracerr::wrap!())?,
            items: item_consumption(&family),
            competency: query
                .year
                .map(|y| competency(&family, y))
                .transpose()
                .map_err(tracerr::wrap!())?,
        })
    }
}

#[cfg(test)]
mod spec {
    use common::{Money, Percent, RawDate};
    use rust_decimal::Decimal;

    use crate::domain::{
        contract::{amendment, Details, Role, Root},
        payment::{self, LineItem, LineItemId, Payment},
        Amendment, Contract,
    };
    use crate::read::family::resolve_family;

    use super::{competency, item_consumption, payment_history, yearly_totals};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn money(s: &str) -> Money {
        Money::new(decimal(s))
    }

    fn item(description: &str, quantity: &str, price: &str) -> LineItem {
        LineItem {
            id: LineItemId::new(),
            description: description.to_owned(),
            quantity: Some(decimal(quantity)),
            unit_price: Some(money(price)),
        }
    }

    fn payment(
        id: &str,
        date: &str,
        period: Option<(&str, &str)>,
        amount: &str,
        non_consuming: bool,
        line_items: Vec<LineItem>,
    ) -> Payment {
        Payment {
            id: payment::Id::from(id),
            date: RawDate::new(date),
            amount_paid: money(amount),
            invoice_number: String::new(),
            process_number: String::new(),
            process_link: None,
            period_start: period.map(|(s, _)| RawDate::new(s)),
            period_end: period.map(|(_, e)| RawDate::new(e)),
            is_non_consuming: non_consuming,
            line_items,
        }
    }

    fn family_contracts() -> Vec<Contract> {
        let root = Contract {
            id: "r".into(),
            contracting_unit: None,
            contractor: None,
            value: money("100000"),
            start_date: None,
            end_date: None,
            signature_date: None,
            monthly_estimate: None,
            payments: vec![
                payment(
                    "p-feb",
                    "2024-03-10",
                    Some(("2024-02-01", "2024-02-29")),
                    "300",
                    false,
                    vec![item("Diária", "2", "100"), item("Lanche", "4", "25")],
                ),
                payment("p-none", "2024-01-05", None, "50", false, vec![]),
                payment(
                    "p-trd",
                    "2024-02-10",
                    Some(("2024-01-01", "2024-01-31")),
                    "900",
                    true,
                    vec![item("Diária", "9", "100")],
                ),
            ],
            details: Details::default(),
            role: Role::Root(Root::default()),
        };
        let amendment = Contract {
            id: "a".into(),
            payments: vec![payment(
                "p-dec",
                "2025-01-10",
                Some(("2024-12-01", "2024-12-31")),
                "400",
                false,
                vec![item(" Diária ", "1", "100"), item("", "6", "100")],
            )],
            role: Role::Amendment(Amendment {
                parent_id: "r".into(),
                kind: amendment::Kind::Term,
                number: String::new(),
                process_number: String::new(),
                process_link: None,
                justification: String::new(),
                signature_date: RawDate::default(),
                manager: None,
                inspectors: None,
            }),
            ..root.clone()
        };
        vec![root, amendment]
    }

    #[test]
    fn history_is_ordered_by_period() {
        let contracts = family_contracts();
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let history = payment_history(&family).unwrap();

        assert_eq!(
            history
                .iter()
                .map(|e| e.payment.id.as_ref())
                .collect::<Vec<&str>>(),
            ["p-trd", "p-feb", "p-dec", "p-none"],
        );
        assert!(history[2].from_amendment);
        assert!(history[2].origin.as_ref() == "a");
        assert!(history[0].payment.is_non_consuming);
    }

    #[test]
    fn yearly_totals_skip_non_consuming() {
        let contracts = family_contracts();
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let totals = yearly_totals(&family).unwrap();

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&2024], money("700"));
    }

    #[test]
    fn items_are_grouped_and_sorted() {
        let contracts = family_contracts();
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let items = item_consumption(&family);

        assert_eq!(
            items
                .iter()
                .map(|i| (i.description.as_str(), i.total))
                .collect::<Vec<_>>(),
            [
                ("", money("600")),
                ("Diária", money("300")),
                ("Lanche", money("100")),
            ],
        );
        assert_eq!(items[2].share, Percent::new(decimal("10")).unwrap());
    }

    #[test]
    fn competency_buckets_by_period_month() {
        let contracts = family_contracts();
        let family = resolve_family(&contracts, &"r".into()).unwrap();

        let c = competency(&family, 2024).unwrap();

        assert_eq!(c.month_total(1), Money::ZERO);
        assert_eq!(c.month_total(2), money("300"));
        assert_eq!(c.months[1]["Lanche"], money("100"));
        assert_eq!(c.month_total(12), money("700"));
        assert_eq!(c.months[11]["Diária"], money("100"));
        assert_eq!(c.month_total(13), Money::ZERO);

        assert_eq!(
            competency(&family, 2023).unwrap().month_total(2),
            Money::ZERO,
        );
    }
}
