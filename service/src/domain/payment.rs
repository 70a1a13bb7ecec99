//! [`Payment`] definitions.

use common::{Money, RawDate};
use derive_more::{AsRef, Display, From, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Contract;

/// Payment made under a [`Contract`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// Date when the money moved.
    #[serde(rename = "data", default)]
    pub date: RawDate,

    /// Amount paid.
    #[serde(rename = "valorPago", default)]
    pub amount_paid: Money,

    /// Number of the invoice being paid.
    #[serde(rename = "notaFiscal", default)]
    pub invoice_number: String,

    /// Number of the administrative process of this [`Payment`].
    #[serde(rename = "processoPagamentoSei", default)]
    pub process_number: String,

    /// Link to the administrative process of this [`Payment`].
    #[serde(
        rename = "linkPagamentoSei",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub process_link: Option<String>,

    /// First day of the service period covered by this [`Payment`].
    #[serde(
        rename = "periodoDe",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub period_start: Option<RawDate>,

    /// Last day of the service period covered by this [`Payment`].
    ///
    /// Determines the competency this [`Payment`] is accounted to.
    #[serde(
        rename = "periodoAte",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub period_end: Option<RawDate>,

    /// Indicator whether this [`Payment`] moves money without consuming the
    /// balance of the [`Contract`] (a "TRD" payment).
    #[serde(rename = "isTRD", default)]
    pub is_non_consuming: bool,

    /// [`LineItem`]s detailing this [`Payment`].
    #[serde(rename = "detalhes", default)]
    pub line_items: Vec<LineItem>,
}

impl Payment {
    /// Returns the [`LineItem`] with the provided ID.
    #[must_use]
    pub fn line_item(&self, id: &LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|i| &i.id == id)
    }
}

/// ID of a [`Payment`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(format!("pag_{}", Uuid::new_v4().simple()))
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Detail line of a [`Payment`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LineItem {
    /// ID of this [`LineItem`].
    pub id: LineItemId,

    /// Description of the billed item.
    #[serde(rename = "descricao", default)]
    pub description: String,

    /// Billed quantity.
    #[serde(rename = "quantidade", default)]
    pub quantity: Option<Decimal>,

    /// Price of a single unit.
    #[serde(rename = "valorUnitario", default)]
    pub unit_price: Option<Money>,
}

impl LineItem {
    /// Returns the monetary contribution of this [`LineItem`].
    ///
    /// Missing quantity or unit price contribute nothing.
    #[must_use]
    pub fn total(&self) -> Money {
        match (self.quantity, self.unit_price) {
            (Some(qty), Some(price)) => price * qty,
            (None, _) | (_, None) => Money::ZERO,
        }
    }
}

/// ID of a [`LineItem`].
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct LineItemId(String);

impl LineItemId {
    /// Creates a new random [`LineItemId`].
    #[must_use]
    pub fn new() -> Self {
        Self(format!("item_{}", Uuid::new_v4().simple()))
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for LineItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use super::{LineItem, LineItemId};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(quantity: Option<&str>, unit_price: Option<&str>) -> LineItem {
        LineItem {
            id: LineItemId::from("item_1"),
            description: "Diária".to_owned(),
            quantity: quantity.map(decimal),
            unit_price: unit_price.map(|p| Money::new(decimal(p))),
        }
    }

    #[test]
    fn line_item_total_is_computed() {
        assert_eq!(
            item(Some("3"), Some("10.5")).total(),
            Money::new(decimal("31.5")),
        );
        assert_eq!(
            item(Some("0.125"), Some("8")).total(),
            Money::new(decimal("1")),
        );
        assert_eq!(item(None, Some("8")).total(), Money::ZERO);
        assert_eq!(item(Some("2"), None).total(), Money::ZERO);
    }

    #[test]
    fn generated_ids_are_prefixed() {
        assert!(super::Id::new().as_ref().starts_with("pag_"));
        assert!(LineItemId::new().as_ref().starts_with("item_"));
        assert_ne!(LineItemId::new(), LineItemId::new());
    }
}
