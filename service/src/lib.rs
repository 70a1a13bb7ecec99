//! Service contains the contract aggregation engine.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod error;
pub mod infra;
pub mod query;
pub mod read;

#[cfg(all(test, not(feature = "json")))]
use serde_json as _;

pub use self::{
    command::Command, error::ConfigurationError, query::Query,
    read::Snapshot,
};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    /// [`query::ForecastSpending`] configuration.
    pub forecast: query::forecast::Config,
}

/// Domain service answering [`Query`]s over a [`Snapshot`] of contract
/// records.
///
/// Holds no records itself: every [`Query`] carries the [`Snapshot`] it's
/// answered over.
#[derive(Clone, Debug, Default)]
pub struct Service {
    /// Configuration of this [`Service`].
    config: Config,
}

impl Service {
    /// Creates a new [`Service`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
