//! [`Config`]-related definitions.

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use rust_decimal::Decimal;
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service configuration.
    pub service: Service,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let config: Self = ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()?;
        config.service.forecast.validate()?;
        Ok(config)
    }
}

/// Service configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Spending forecast configuration.
    pub forecast: Forecast,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            forecast:
                Forecast {
                    average_month_days,
                    minimum_observed_months,
                    deviation_tolerance,
                },
        } = value;
        Self {
            forecast: service::query::forecast::Config {
                average_month_days,
                minimum_observed_months,
                deviation_tolerance,
            },
        }
    }
}

/// Spending forecast configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Forecast {
    /// Average length of a month in days.
    #[default(Decimal::new(3044, 2))]
    pub average_month_days: Decimal,

    /// Lower bound of the observed months count.
    #[default(Decimal::ONE)]
    pub minimum_observed_months: Decimal,

    /// Deviation from the monthly estimate (in percent) tolerated before
    /// flagging the spending as over the estimate.
    #[default(Decimal::TEN)]
    pub deviation_tolerance: Decimal,
}

impl Forecast {
    /// Checks this [`Forecast`] configuration to be usable.
    ///
    /// # Errors
    ///
    /// - If the `average_month_days` is not positive.
    /// - If the `minimum_observed_months` is negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.average_month_days <= Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "`service.forecast.average_month_days` must be positive, \
                 got `{}`",
                self.average_month_days,
            )));
        }
        if self.minimum_observed_months < Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "`service.forecast.minimum_observed_months` must not be \
                 negative, got `{}`",
                self.minimum_observed_months,
            )));
        }
        Ok(())
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
