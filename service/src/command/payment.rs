//! [`Command`]s for managing [`Payment`]s of a [`Contract`].

use common::{Money, RawDate};
use derive_more::{Display, Error};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, payment, Contract, Payment},
    infra::Store,
};

use super::Command;

/// Editable fields of a [`Payment`].
#[derive(Clone, Debug, Default)]
pub struct Fields {
    /// Date when the money moved.
    pub date: RawDate,

    /// Amount paid.
    pub amount_paid: Money,

    /// Number of the invoice being paid.
    pub invoice_number: String,

    /// Number of the administrative process of the [`Payment`].
    pub process_number: String,

    /// Link to the administrative process of the [`Payment`].
    pub process_link: Option<String>,

    /// First day of the covered service period.
    pub period_start: Option<RawDate>,

    /// Last day of the covered service period.
    pub period_end: Option<RawDate>,

    /// Indicator whether the [`Payment`] doesn't consume the balance.
    pub is_non_consuming: bool,
}

impl Fields {
    /// Checks the dates of these [`Fields`].
    ///
    /// # Errors
    ///
    /// If the [`Payment`] date is blank, or any of the dates is not a
    /// calendar one.
    fn validate(&self) -> Result<(), Traced<ExecutionError>> {
        use ExecutionError as E;

        if self.date.is_blank() {
            return Err(tracerr::new!(E::MissingDate("data")));
        }
        for (field, raw) in [
            ("data", Some(&self.date)),
            ("periodoDe", self.period_start.as_ref()),
            ("periodoAte", self.period_end.as_ref()),
        ] {
            if let Some(raw) = raw {
                if raw.parse().is_err() {
                    return Err(tracerr::new!(E::InvalidDate {
                        field,
                        value: raw.clone(),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Converts these [`Fields`] into a [`Payment`] with the provided ID and
    /// line items.
    fn into_payment(
        self,
        id: payment::Id,
        line_items: Vec<payment::LineItem>,
    ) -> Payment {
        let Self {
            date,
            amount_paid,
            invoice_number,
            process_number,
            process_link,
            period_start,
            period_end,
            is_non_consuming,
        } = self;
        Payment {
            id,
            date,
            amount_paid,
            invoice_number,
            process_number,
            process_link,
            period_start,
            period_end,
            is_non_consuming,
            line_items,
        }
    }
}

/// [`Command`] for registering a new [`Payment`] against a [`Contract`]
/// record.
#[derive(Clone, Debug)]
pub struct RegisterPayment {
    /// ID of the [`Contract`] record to register the [`Payment`] against.
    pub contract_id: contract::Id,

    /// [`Fields`] of the new [`Payment`].
    pub fields: Fields,
}

impl Command<RegisterPayment> for Store {
    type Ok = payment::Id;
    type Err = Traced<ExecutionError>;

    fn execute(&mut self, cmd: RegisterPayment) -> Result<Self::Ok, Self::Err> {
        let RegisterPayment {
            contract_id,
            fields,
        } = cmd;

        fields.validate().map_err(tracerr::wrap!())?;
        let contract =
            contract_mut(self, &contract_id).map_err(tracerr::wrap!())?;

        let payment = fields.into_payment(payment::Id::new(), vec![]);
        let id = payment.id.clone();
        contract.payments.push(payment);

        log::info!(
            "registered `Payment(id: {id})` of `Contract(id: {contract_id})`",
        );
        Ok(id)
    }
}

/// [`Command`] for updating an existing [`Payment`].
///
/// Its ID and line items are preserved.
#[derive(Clone, Debug)]
pub struct UpdatePayment {
    /// ID of the [`Contract`] record the [`Payment`] is registered against.
    pub contract_id: contract::Id,

    /// ID of the [`Payment`] to update.
    pub payment_id: payment::Id,

    /// New [`Fields`] of the [`Payment`].
    pub fields: Fields,
}

impl Command<UpdatePayment> for Store {
    type Ok = ();
    type Err = Traced<ExecutionError>;

    fn execute(&mut self, cmd: UpdatePayment) -> Result<Self::Ok, Self::Err> {
        let UpdatePayment {
            contract_id,
            payment_id,
            fields,
        } = cmd;

        fields.validate().map_err(tracerr::wrap!())?;
        let payment = payment_mut(self, &contract_id, &payment_id)
            .map_err(tracerr::wrap!())?;

        let line_items = std::mem::take(&mut payment.line_items);
        *payment = fields.into_payment(payment_id.clone(), line_items);

        log::info!(
            "updated `Payment(id: {payment_id})` of \
             `Contract(id: {contract_id})`",
        );
        Ok(())
    }
}

/// [`Command`] for removing a [`Payment`].
#[derive(Clone, Debug)]
pub struct RemovePayment {
    /// ID of the [`Contract`] record the [`Payment`] is registered against.
    pub contract_id: contract::Id,

    /// ID of the [`Payment`] to remove.
    pub payment_id: payment::Id,
}

impl Command<RemovePayment> for Store {
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    fn execute(&mut self, cmd: RemovePayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RemovePayment {
            contract_id,
            payment_id,
        } = cmd;

        let contract =
            contract_mut(self, &contract_id).map_err(tracerr::wrap!())?;
        let pos = contract
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| E::PaymentNotExists {
                contract: contract_id.clone(),
                payment: payment_id.clone(),
            })
            .map_err(tracerr::wrap!())?;
        let removed = contract.payments.remove(pos);

        log::info!(
            "removed `Payment(id: {payment_id})` of \
             `Contract(id: {contract_id})`",
        );
        Ok(removed)
    }
}

/// Looks up the [`Contract`] record with the provided ID for modification.
///
/// # Errors
///
/// With [`ExecutionError::ContractNotExists`] if there is no such record.
pub(super) fn contract_mut<'s>(
    store: &'s mut Store,
    id: &contract::Id,
) -> Result<&'s mut Contract, Traced<ExecutionError>> {
    store
        .get_mut(id)
        .ok_or_else(|| ExecutionError::ContractNotExists(id.clone()))
        .map_err(tracerr::wrap!())
}

/// Looks up the [`Payment`] with the provided ID for modification.
///
/// # Errors
///
/// With [`ExecutionError::ContractNotExists`] or
/// [`ExecutionError::PaymentNotExists`] if there is no such record.
pub(super) fn payment_mut<'s>(
    store: &'s mut Store,
    contract_id: &contract::Id,
    payment_id: &payment::Id,
) -> Result<&'s mut Payment, Traced<ExecutionError>> {
    contract_mut(store, contract_id)
        .map_err(tracerr::wrap!())?
        .payment_mut(payment_id)
        .ok_or_else(|| ExecutionError::PaymentNotExists {
            contract: contract_id.clone(),
            payment: payment_id.clone(),
        })
        .map_err(tracerr::wrap!())
}

/// Error of [`Payment`] managing [`Command`]s execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Payment`] with the provided ID does not exist.
    #[display("`Payment(id: {payment})` of `Contract(id: {contract})` does \
               not exist")]
    PaymentNotExists {
        /// ID of the [`Contract`] record.
        #[error(not(source))]
        contract: contract::Id,

        /// ID of the missing [`Payment`].
        #[error(not(source))]
        payment: payment::Id,
    },

    /// Mandatory date is blank.
    #[display("`{_0}` is required")]
    MissingDate(#[error(not(source))] &'static str),

    /// Date is not a calendar one.
    #[display("`{field}` is not a date: `{value}`")]
    InvalidDate {
        /// Persisted name of the field.
        #[error(not(source))]
        field: &'static str,

        /// Raw value of the field.
        #[error(not(source))]
        value: RawDate,
    },
}

#[cfg(test)]
mod spec {
    use common::{Money, RawDate};
    use rust_decimal::Decimal;

    use crate::{
        command::{contract, Command as _},
        domain::payment::{self, LineItem, LineItemId},
        infra::Store,
    };

    use super::{
        ExecutionError, Fields, RegisterPayment, RemovePayment, UpdatePayment,
    };

    fn money(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap())
    }

    fn fields(date: &str, amount: &str) -> Fields {
        Fields {
            date: RawDate::new(date),
            amount_paid: money(amount),
            period_start: Some(RawDate::new("2024-01-01")),
            period_end: Some(RawDate::new("2024-01-31")),
            ..Fields::default()
        }
    }

    fn store() -> (Store, crate::domain::contract::Id) {
        let mut store = Store::default();
        let id = store
            .execute(contract::RegisterContract::default())
            .unwrap();
        (store, id)
    }

    #[test]
    fn registers_and_removes() {
        let (mut store, contract_id) = store();

        let id = store
            .execute(RegisterPayment {
                contract_id: contract_id.clone(),
                fields: fields("2024-02-05", "1500"),
            })
            .unwrap();
        assert!(id.as_ref().starts_with("pag_"));
        assert_eq!(
            store.get(&contract_id).unwrap().payment(&id).unwrap().amount_paid,
            money("1500"),
        );

        let removed = store
            .execute(RemovePayment {
                contract_id: contract_id.clone(),
                payment_id: id.clone(),
            })
            .unwrap();
        assert_eq!(removed.id, id);
        assert!(store.get(&contract_id).unwrap().payments.is_empty());

        let err = store
            .execute(RemovePayment {
                contract_id,
                payment_id: id,
            })
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::PaymentNotExists { .. },
        ));
    }

    #[test]
    fn update_preserves_line_items() {
        let (mut store, contract_id) = store();
        let id = store
            .execute(RegisterPayment {
                contract_id: contract_id.clone(),
                fields: fields("2024-02-05", "1500"),
            })
            .unwrap();
        store
            .get_mut(&contract_id)
            .unwrap()
            .payment_mut(&id)
            .unwrap()
            .line_items
            .push(LineItem {
                id: LineItemId::from("item_1"),
                description: "Diária".to_owned(),
                quantity: None,
                unit_price: None,
            });

        store
            .execute(UpdatePayment {
                contract_id: contract_id.clone(),
                payment_id: id.clone(),
                fields: Fields {
                    is_non_consuming: true,
                    ..fields("2024-02-06", "1600")
                },
            })
            .unwrap();

        let p = store.get(&contract_id).unwrap().payment(&id).unwrap();
        assert_eq!(p.amount_paid, money("1600"));
        assert!(p.is_non_consuming);
        assert_eq!(p.line_items.len(), 1);
    }

    #[test]
    fn rejects_bad_dates_and_unknown_records() {
        let (mut store, contract_id) = store();

        let err = store
            .execute(RegisterPayment {
                contract_id: contract_id.clone(),
                fields: fields(" ", "1"),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "`data` is required");

        let err = store
            .execute(RegisterPayment {
                contract_id: contract_id.clone(),
                fields: Fields {
                    period_end: Some(RawDate::new("2024-02-30")),
                    ..fields("2024-02-05", "1")
                },
            })
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidDate { field: "periodoAte", .. },
        ));

        let err = store
            .execute(UpdatePayment {
                contract_id: "nope".into(),
                payment_id: payment::Id::new(),
                fields: fields("2024-02-05", "1"),
            })
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ContractNotExists(_),
        ));
    }
}
