//! [`ConfigurationError`] definition.

use common::{Date, RawDate};
use derive_more::{Display, Error};
use tracerr::Traced;
use tracing as log;

use crate::domain::contract;
#[cfg(doc)]
use crate::domain::{Amendment, Contract, Payment};

/// Error of a [`Contract`] family being configured in a way the engine
/// cannot derive data from.
///
/// Callers are expected to show the derived data as unavailable rather than
/// abort.
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
pub enum ConfigurationError {
    /// [`Amendment`] references a parent [`Contract`] which does not exist.
    #[display("`Contract(id: {amendment})` references missing parent \
               `Contract(id: {parent})`")]
    ParentNotExists {
        /// ID of the orphaned [`Amendment`].
        #[error(not(source))]
        amendment: contract::Id,

        /// ID of the missing parent.
        #[error(not(source))]
        parent: contract::Id,
    },

    /// Root [`Contract`] with the provided ID does not exist.
    #[display("root `Contract(id: {_0})` does not exist")]
    RootNotExists(#[error(not(source))] contract::Id),

    /// [`Amendment`] doesn't belong to the family of the provided root
    /// [`Contract`].
    #[display("`Contract(id: {amendment})` is not an amendment of \
               `Contract(id: {root})`")]
    AmendmentNotInFamily {
        /// ID of the root [`Contract`].
        #[error(not(source))]
        root: contract::Id,

        /// ID of the looked up [`Amendment`].
        #[error(not(source))]
        amendment: contract::Id,
    },

    /// Term [`Amendment`] has no predecessor in its date-sorted chain.
    #[display("term `Contract(id: {_0})` has no predecessor in its chain")]
    NoPredecessor(#[error(not(source))] contract::Id),

    /// Date field is missing or is not a calendar date.
    #[display("`Contract(id: {contract})` has invalid `{field}`: `{value}`")]
    InvalidDate {
        /// ID of the [`Contract`] owning the field.
        #[error(not(source))]
        contract: contract::Id,

        /// Invalid field.
        #[error(not(source))]
        field: DateField,

        /// Raw value of the field.
        #[error(not(source))]
        value: RawDate,
    },
}

/// Date field of a [`Contract`] record, displayed by its persisted name.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum DateField {
    /// Start of the [`Contract`] validity.
    #[display("dataInicio")]
    Start,

    /// End of the [`Contract`] validity.
    #[display("dataFim")]
    End,

    /// Signature of the [`Contract`].
    #[display("dataAssinatura")]
    Signature,

    /// Signature of the [`Amendment`].
    #[display("aditivo.dataAssinatura")]
    AmendmentSignature,

    /// Date of a [`Payment`].
    #[display("pagamentos.data")]
    PaymentDate,

    /// Start of the period covered by a [`Payment`].
    #[display("pagamentos.periodoDe")]
    PeriodStart,

    /// End of the period covered by a [`Payment`].
    #[display("pagamentos.periodoAte")]
    PeriodEnd,
}

/// Parses the optional `raw` date of the `field`.
///
/// Blank and absent values are [`None`].
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if the value is not a calendar
/// date.
pub(crate) fn parse_date(
    contract: &contract::Id,
    field: DateField,
    raw: Option<&RawDate>,
) -> Result<Option<Date>, Traced<ConfigurationError>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.parse().map_err(|_| {
        tracerr::new!(ConfigurationError::InvalidDate {
            contract: contract.clone(),
            field,
            value: raw.clone(),
        })
    })
}

/// Parses the optional `raw` signature date of the `field`, as only used to
/// classify a lifecycle status.
///
/// Malformed values are logged and treated as absent.
pub(crate) fn lenient_signature(
    contract: &contract::Id,
    field: DateField,
    raw: Option<&RawDate>,
) -> Option<Date> {
    parse_date(contract, field, raw).unwrap_or_else(|e| {
        log::warn!("{}, treating it as absent", e.as_ref());
        None
    })
}

/// Parses the mandatory `raw` date of the `field`.
///
/// # Errors
///
/// With [`ConfigurationError::InvalidDate`] if the value is absent, blank or
/// not a calendar date.
pub(crate) fn require_date(
    contract: &contract::Id,
    field: DateField,
    raw: Option<&RawDate>,
) -> Result<Date, Traced<ConfigurationError>> {
    parse_date(contract, field, raw)
        .map_err(tracerr::wrap!())?
        .ok_or_else(|| {
            tracerr::new!(ConfigurationError::InvalidDate {
                contract: contract.clone(),
                field,
                value: raw.cloned().unwrap_or_default(),
            })
        })
}

#[cfg(test)]
mod spec {
    use common::{Date, RawDate};

    use crate::domain::contract;

    use super::{
        lenient_signature, parse_date, require_date, ConfigurationError,
        DateField,
    };

    #[test]
    fn parses_present_dates() {
        let id = contract::Id::from("contrato_1");
        let raw = RawDate::new("2024-03-01");

        assert_eq!(
            parse_date(&id, DateField::Start, Some(&raw)).unwrap(),
            Some(Date::from_calendar(2024, 3, 1).unwrap()),
        );
        assert_eq!(
            require_date(&id, DateField::Start, Some(&raw)).unwrap(),
            Date::from_calendar(2024, 3, 1).unwrap(),
        );
    }

    #[test]
    fn blank_is_absent_but_not_required() {
        let id = contract::Id::from("contrato_1");
        let blank = RawDate::new("  ");

        assert_eq!(parse_date(&id, DateField::End, Some(&blank)).unwrap(), None);
        assert_eq!(parse_date(&id, DateField::End, None).unwrap(), None);

        let err = require_date(&id, DateField::End, None).unwrap_err();
        assert_eq!(
            err.as_ref(),
            &ConfigurationError::InvalidDate {
                contract: id,
                field: DateField::End,
                value: RawDate::default(),
            },
        );
    }

    #[test]
    fn malformed_is_reported() {
        let id = contract::Id::from("contrato_1");
        let raw = RawDate::new("31/12/2024");

        let err = parse_date(&id, DateField::Signature, Some(&raw)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "`Contract(id: contrato_1)` has invalid `dataAssinatura`: \
             `31/12/2024`",
        );
    }

    #[test]
    fn malformed_signature_is_absent() {
        let id = contract::Id::from("contrato_1");

        assert_eq!(
            lenient_signature(
                &id,
                DateField::Signature,
                Some(&RawDate::new("31/12/2024")),
            ),
            None,
        );
        assert_eq!(
            lenient_signature(
                &id,
                DateField::Signature,
                Some(&RawDate::new("2024-12-31")),
            ),
            Some(Date::from_calendar(2024, 12, 31).unwrap()),
        );
    }
}
