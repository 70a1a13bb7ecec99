//! JSON reports of the [`Service`] [`Query`] results.

use common::Date;
use serde::Serialize;
use service::{
    domain::contract,
    query::{
        self, EffectivePersonnel, ForecastSpending, Payments, Summarize,
        WindowFor, Windows,
    },
    Query as _, Service, Snapshot,
};
use tracing as log;

use crate::{args::Command, AsError, Error};

/// Outcome of a [`Query`] for a single root contract.
///
/// [`Query`]: service::Query
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome<'a, T> {
    /// ID of the root contract.
    pub root_id: &'a contract::Id,

    /// Result of the [`Query`], or the [`Error`] why it's unavailable.
    ///
    /// [`Query`]: service::Query
    #[serde(flatten)]
    pub result: Reported<T>,
}

/// Result of a [`Query`] as reported.
///
/// [`Query`]: service::Query
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Reported<T> {
    /// [`Query`] succeeded.
    ///
    /// [`Query`]: service::Query
    Data(T),

    /// Derived data is unavailable.
    Error(Error),
}

impl<T, E: AsError + std::fmt::Display> From<Result<T, E>> for Reported<T> {
    fn from(res: Result<T, E>) -> Self {
        match res {
            Ok(data) => Self::Data(data),
            Err(e) => Self::Error(e.into_error()),
        }
    }
}

/// Result of validating every record of a [`Snapshot`].
#[derive(Debug, Serialize)]
pub struct Validation {
    /// Indicator whether no problems were found.
    pub valid: bool,

    /// Found problems.
    pub problems: Vec<Error>,
}

/// Renders the report of the provided [`Command`] as pretty JSON.
///
/// # Errors
///
/// If the report of a single contract cannot be derived.
pub fn render(
    service: &Service,
    snapshot: &Snapshot<'_>,
    today: Date,
    command: &Command,
) -> Result<String, Error> {
    match command {
        Command::Summary { contract: Some(id) } => {
            let root_id = contract::Id::from(id.as_str());
            let summary = service
                .execute(Summarize {
                    snapshot,
                    root_id: &root_id,
                    today,
                })
                .map_err(AsError::into_error)?;
            to_json(&summary)
        }
        Command::Summary { contract: None } => {
            let summaries = snapshot
                .roots()
                .map(|root| Outcome {
                    root_id: &root.id,
                    result: service
                        .execute(Summarize {
                            snapshot,
                            root_id: &root.id,
                            today,
                        })
                        .into(),
                })
                .collect::<Vec<_>>();
            to_json(&summaries)
        }
        Command::Window {
            amendment: Some(id),
            ..
        } => {
            let amendment_id = contract::Id::from(id.as_str());
            let window = service
                .execute(WindowFor {
                    snapshot,
                    amendment_id: &amendment_id,
                    today,
                })
                .map_err(AsError::into_error)?;
            to_json(&window)
        }
        Command::Window {
            amendment: None,
            contract,
        } => {
            let root_id =
                contract::Id::from(contract.as_deref().unwrap_or_default());
            let windows = service
                .execute(Windows {
                    snapshot,
                    root_id: &root_id,
                    today,
                })
                .map_err(AsError::into_error)?;
            to_json(&windows)
        }
        Command::Forecast { contract } => {
            let root_id = contract::Id::from(contract.as_str());
            let (summary, forecast) = service
                .execute(ForecastSpending {
                    snapshot,
                    root_id: &root_id,
                    today,
                })
                .map_err(AsError::into_error)?;
            to_json(&Forecasted { summary, forecast })
        }
        Command::Personnel { contract, as_of } => {
            let root_id = contract::Id::from(contract.as_str());
            let personnel = service
                .execute(EffectivePersonnel {
                    snapshot,
                    root_id: &root_id,
                    as_of: as_of.or(Some(today)),
                })
                .map_err(AsError::into_error)?;
            to_json(&personnel)
        }
        Command::Payments { contract, year } => {
            let root_id = contract::Id::from(contract.as_str());
            let report = service
                .execute(Payments {
                    snapshot,
                    root_id: &root_id,
                    year: *year,
                })
                .map_err(AsError::into_error)?;
            to_json(&report)
        }
        Command::Validate => to_json(&validate(service, snapshot, today)),
    }
}

/// [`query::Summary`] along with the [`query::Forecast`] based on it.
#[derive(Debug, Serialize)]
struct Forecasted {
    /// [`query::Summary`] the [`query::Forecast`] is based on.
    summary: query::Summary,

    /// [`query::Forecast`] itself.
    forecast: query::Forecast,
}

/// Collects every problem preventing the [`Service`] from deriving data out
/// of the provided [`Snapshot`].
#[must_use]
pub fn validate(
    service: &Service,
    snapshot: &Snapshot<'_>,
    today: Date,
) -> Validation {
    let mut problems = snapshot
        .orphans()
        .into_iter()
        .map(AsError::into_error)
        .collect::<Vec<_>>();
    for root in snapshot.roots() {
        let root_id = &root.id;
        if let Err(e) = service.execute(Windows {
            snapshot,
            root_id,
            today,
        }) {
            problems.push(e.into_error());
        }
        if let Err(e) = service.execute(Payments {
            snapshot,
            root_id,
            year: None,
        }) {
            problems.push(e.into_error());
        }
        if let Err(e) = service.execute(ForecastSpending {
            snapshot,
            root_id,
            today,
        }) {
            problems.push(e.into_error());
        }
    }
    problems.dedup_by(|a, b| a.message == b.message);

    log::info!("validated, {} problems found", problems.len());
    Validation {
        valid: problems.is_empty(),
        problems,
    }
}

/// Serializes the provided `value` as pretty JSON.
///
/// # Errors
///
/// If the `value` fails to serialize.
pub fn to_json(value: &impl Serialize) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(AsError::into_error)
}
