//! JSON [`Document`] persisting [`Contract`] records.

use common::{Money, RawDate};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        contract::{self, amendment, Details, Role, Root},
        Amendment, Contract, Party, Payment, Person,
    },
    infra::Store,
};

/// Persisted document holding all the [`Contract`] records of a [`Store`].
///
/// Shaped as `{"contratos": [...]}`, every record keeping the persisted
/// field names.
#[derive(Clone, Debug, Default, Eq, From, PartialEq)]
pub struct Document {
    /// [`Contract`] records, in insertion order.
    pub contracts: Vec<Contract>,
}

impl Document {
    /// Decodes a [`Document`] from the provided JSON text.
    ///
    /// # Errors
    ///
    /// If the text is not a JSON document of the expected shape, or any of
    /// its records mixes up root and amendment data.
    pub fn from_json(json: &str) -> Result<Self, Traced<DecodeError>> {
        let raw = serde_json::from_str::<Raw>(json)
            .map_err(DecodeError::Json)
            .map_err(tracerr::wrap!())?;
        let contracts = raw
            .contratos
            .into_iter()
            .map(Contract::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(tracerr::wrap!())?;
        log::debug!("decoded {} `Contract` records", contracts.len());
        Ok(Self { contracts })
    }

    /// Encodes this [`Document`] as pretty-printed JSON text.
    ///
    /// # Errors
    ///
    /// If the JSON serialization fails.
    pub fn to_json(&self) -> Result<String, Traced<DecodeError>> {
        let raw = Raw {
            contratos: self.contracts.iter().cloned().map(Record::from).collect(),
        };
        serde_json::to_string_pretty(&raw)
            .map_err(DecodeError::Json)
            .map_err(tracerr::wrap!())
    }
}

impl From<Document> for Store {
    fn from(doc: Document) -> Self {
        Self::new(doc.contracts)
    }
}

impl From<Store> for Document {
    fn from(store: Store) -> Self {
        Self {
            contracts: store.into(),
        }
    }
}

/// Error of decoding or encoding a [`Document`].
#[derive(Debug, Display, Error)]
pub enum DecodeError {
    /// JSON is malformed or doesn't match the expected shape.
    #[display("malformed JSON document: {_0}")]
    Json(serde_json::Error),

    /// Record has a parent reference, but no amendment data.
    #[display("`Contract(id: {_0})` has `parentId`, but no `aditivo`")]
    MissingAmendment(#[error(not(source))] contract::Id),

    /// Record has amendment data, but no parent reference.
    #[display("`Contract(id: {_0})` has `aditivo`, but no `parentId`")]
    MissingParent(#[error(not(source))] contract::Id),
}

/// Persisted shape of a [`Document`].
#[derive(Deserialize, Serialize)]
struct Raw {
    /// Persisted [`Contract`] records.
    #[serde(default)]
    contratos: Vec<Record>,
}

/// Persisted flat shape of a [`Contract`] record.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    id: contract::Id,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<contract::Id>,

    #[serde(rename = "unidade", default, skip_serializing_if = "Option::is_none")]
    contracting_unit: Option<Party>,

    #[serde(rename = "empresa", default, skip_serializing_if = "Option::is_none")]
    contractor: Option<Party>,

    #[serde(rename = "valorTotal", default)]
    value: Money,

    #[serde(rename = "dataInicio", default, skip_serializing_if = "Option::is_none")]
    start_date: Option<RawDate>,

    #[serde(rename = "dataFim", default, skip_serializing_if = "Option::is_none")]
    end_date: Option<RawDate>,

    #[serde(
        rename = "dataAssinatura",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    signature_date: Option<RawDate>,

    #[serde(
        rename = "estimativaMensal",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    monthly_estimate: Option<Money>,

    #[serde(rename = "pagamentos", default)]
    payments: Vec<Payment>,

    #[serde(rename = "processoSei", default, skip_serializing_if = "Option::is_none")]
    process_number: Option<String>,

    #[serde(rename = "linkSei", default, skip_serializing_if = "Option::is_none")]
    process_link: Option<String>,

    #[serde(
        rename = "numeroContrato",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    contract_number: Option<String>,

    #[serde(
        rename = "tipoContrato",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    contract_type: Option<String>,

    #[serde(rename = "objeto", default, skip_serializing_if = "Option::is_none")]
    object: Option<String>,

    #[serde(
        rename = "tempoContrato",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    duration: Option<String>,

    #[serde(rename = "aditivo", default, skip_serializing_if = "Option::is_none")]
    amendment: Option<AmendmentRecord>,

    #[serde(
        rename = "gestorInicial",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    initial_manager: Option<Person>,

    #[serde(
        rename = "fiscaisIniciais",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    initial_inspectors: Option<Vec<Person>>,
}

/// Persisted shape of an [`Amendment`].
#[derive(Deserialize, Serialize)]
struct AmendmentRecord {
    #[serde(rename = "tipo")]
    kind: amendment::Kind,

    #[serde(rename = "numero", default)]
    number: String,

    #[serde(rename = "processoSei", default)]
    process_number: String,

    #[serde(rename = "linkSei", default, skip_serializing_if = "Option::is_none")]
    process_link: Option<String>,

    #[serde(rename = "justificativa", default)]
    justification: String,

    #[serde(rename = "dataAssinatura", default)]
    signature_date: RawDate,

    #[serde(rename = "gestor", default, skip_serializing_if = "Option::is_none")]
    manager: Option<Person>,

    #[serde(rename = "fiscais", default, skip_serializing_if = "Option::is_none")]
    inspectors: Option<Vec<Person>>,
}

impl TryFrom<Record> for Contract {
    type Error = Traced<DecodeError>;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let Record {
            id,
            parent_id,
            contracting_unit,
            contractor,
            value,
            start_date,
            end_date,
            signature_date,
            monthly_estimate,
            payments,
            process_number,
            process_link,
            contract_number,
            contract_type,
            object,
            duration,
            amendment,
            initial_manager,
            initial_inspectors,
        } = record;

        let role = match (parent_id, amendment) {
            (None, None) => Role::Root(Root {
                initial_manager,
                initial_inspectors,
            }),
            (Some(parent_id), Some(a)) => Role::Amendment(Amendment {
                parent_id,
                kind: a.kind,
                number: a.number,
                process_number: a.process_number,
                process_link: a.process_link,
                justification: a.justification,
                signature_date: a.signature_date,
                manager: a.manager,
                inspectors: a.inspectors,
            }),
            (Some(_), None) => {
                return Err(tracerr::new!(DecodeError::MissingAmendment(id)));
            }
            (None, Some(_)) => {
                return Err(tracerr::new!(DecodeError::MissingParent(id)));
            }
        };

        Ok(Self {
            id,
            contracting_unit,
            contractor,
            value,
            start_date,
            end_date,
            signature_date,
            monthly_estimate,
            payments,
            details: Details {
                process_number,
                process_link,
                contract_number,
                contract_type,
                object,
                duration,
            },
            role,
        })
    }
}

impl From<Contract> for Record {
    fn from(contract: Contract) -> Self {
        let Contract {
            id,
            contracting_unit,
            contractor,
            value,
            start_date,
            end_date,
            signature_date,
            monthly_estimate,
            payments,
            details:
                Details {
                    process_number,
                    process_link,
                    contract_number,
                    contract_type,
                    object,
                    duration,
                },
            role,
        } = contract;

        let (parent_id, amendment, initial_manager, initial_inspectors) =
            match role {
                Role::Root(Root {
                    initial_manager,
                    initial_inspectors,
                }) => (None, None, initial_manager, initial_inspectors),
                Role::Amendment(a) => (
                    Some(a.parent_id),
                    Some(AmendmentRecord {
                        kind: a.kind,
                        number: a.number,
                        process_number: a.process_number,
                        process_link: a.process_link,
                        justification: a.justification,
                        signature_date: a.signature_date,
                        manager: a.manager,
                        inspectors: a.inspectors,
                    }),
                    None,
                    None,
                ),
            };

        Self {
            id,
            parent_id,
            contracting_unit,
            contractor,
            value,
            start_date,
            end_date,
            signature_date,
            monthly_estimate,
            payments,
            process_number,
            process_link,
            contract_number,
            contract_type,
            object,
            duration,
            amendment,
            initial_manager,
            initial_inspectors,
        }
    }
}
