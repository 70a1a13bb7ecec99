//! [`Command`]s for managing [`LineItem`]s of a [`Payment`].

use common::Money;
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract,
        payment::{self, LineItem, LineItemId},
    },
    infra::Store,
};
#[cfg(doc)]
use crate::domain::{Contract, Payment};

use super::{payment::payment_mut, Command};

/// [`Command`] for adding a new [`LineItem`] to a [`Payment`].
#[derive(Clone, Debug)]
pub struct AddLineItem {
    /// ID of the [`Contract`] record the [`Payment`] is registered against.
    pub contract_id: contract::Id,

    /// ID of the [`Payment`] to detail.
    pub payment_id: payment::Id,

    /// Description of the billed item.
    pub description: String,

    /// Billed quantity.
    pub quantity: Option<Decimal>,

    /// Price of a single unit.
    pub unit_price: Option<Money>,
}

impl Command<AddLineItem> for Store {
    type Ok = LineItemId;
    type Err = Traced<ExecutionError>;

    fn execute(&mut self, cmd: AddLineItem) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddLineItem {
            contract_id,
            payment_id,
            description,
            quantity,
            unit_price,
        } = cmd;

        let payment = payment_mut(self, &contract_id, &payment_id)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let item = LineItem {
            id: LineItemId::new(),
            description: description.trim().to_owned(),
            quantity,
            unit_price,
        };
        let id = item.id.clone();
        payment.line_items.push(item);

        log::info!("added `LineItem(id: {id})` to `Payment(id: {payment_id})`");
        Ok(id)
    }
}

/// [`Command`] for removing a [`LineItem`] from a [`Payment`].
#[derive(Clone, Debug)]
pub struct RemoveLineItem {
    /// ID of the [`Contract`] record the [`Payment`] is registered against.
    pub contract_id: contract::Id,

    /// ID of the detailed [`Payment`].
    pub payment_id: payment::Id,

    /// ID of the [`LineItem`] to remove.
    pub item_id: LineItemId,
}

impl Command<RemoveLineItem> for Store {
    type Ok = LineItem;
    type Err = Traced<ExecutionError>;

    fn execute(&mut self, cmd: RemoveLineItem) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemoveLineItem {
            contract_id,
            payment_id,
            item_id,
        } = cmd;

        let payment = payment_mut(self, &contract_id, &payment_id)
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let pos = payment
            .line_items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| E::LineItemNotExists {
                payment: payment_id.clone(),
                item: item_id.clone(),
            })
            .map_err(tracerr::wrap!())?;
        let removed = payment.line_items.remove(pos);

        log::info!(
            "removed `LineItem(id: {item_id})` from `Payment(id: {payment_id})`",
        );
        Ok(removed)
    }
}

/// Error of [`LineItem`] managing [`Command`]s execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Payment`] lookup failed.
    #[display("`Payment` lookup failed: {_0}")]
    #[from]
    Payment(super::payment::ExecutionError),

    /// [`LineItem`] with the provided ID does not exist.
    #[display("`LineItem(id: {item})` of `Payment(id: {payment})` does not \
               exist")]
    LineItemNotExists {
        /// ID of the [`Payment`].
        #[error(not(source))]
        payment: payment::Id,

        /// ID of the missing [`LineItem`].
        #[error(not(source))]
        item: LineItemId,
    },
}

#[cfg(test)]
mod spec {
    use common::{Money, RawDate};
    use rust_decimal::Decimal;

    use crate::{
        command::{contract, payment, Command as _},
        domain::payment::LineItemId,
        infra::Store,
    };

    use super::{AddLineItem, ExecutionError, RemoveLineItem};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn adds_and_removes_items() {
        let mut store = Store::default();
        let contract_id = store
            .execute(contract::RegisterContract::default())
            .unwrap();
        let payment_id = store
            .execute(payment::RegisterPayment {
                contract_id: contract_id.clone(),
                fields: payment::Fields {
                    date: RawDate::new("2024-02-05"),
                    ..payment::Fields::default()
                },
            })
            .unwrap();

        let item_id = store
            .execute(AddLineItem {
                contract_id: contract_id.clone(),
                payment_id: payment_id.clone(),
                description: " Diária ".to_owned(),
                quantity: Some(decimal("2")),
                unit_price: Some(Money::new(decimal("150"))),
            })
            .unwrap();
        assert!(item_id.as_ref().starts_with("item_"));

        let payment = store
            .get(&contract_id)
            .unwrap()
            .payment(&payment_id)
            .unwrap();
        let item = payment.line_item(&item_id).unwrap();
        assert_eq!(item.description, "Diária");
        assert_eq!(item.total(), Money::new(decimal("300")));

        let removed = store
            .execute(RemoveLineItem {
                contract_id: contract_id.clone(),
                payment_id: payment_id.clone(),
                item_id: item_id.clone(),
            })
            .unwrap();
        assert_eq!(removed.id, item_id);

        let err = store
            .execute(RemoveLineItem {
                contract_id: contract_id.clone(),
                payment_id,
                item_id,
            })
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::LineItemNotExists { .. },
        ));

        let err = store
            .execute(RemoveLineItem {
                contract_id,
                payment_id: "pag_missing".into(),
                item_id: LineItemId::new(),
            })
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Payment(_)));
    }
}
