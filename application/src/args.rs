//! [`Args`] definitions.

use clap::{Parser, Subcommand};
use common::Date;

/// Contract aggregation reports over a JSON document of contracts.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Path to the JSON document with contract records.
    #[arg(short, long, default_value = "dados.json")]
    pub document: String,

    /// Date to report as of (`YYYY-MM-DD`), today in UTC if omitted.
    #[arg(short, long)]
    pub today: Option<Date>,

    /// Report to produce.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Report to produce.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Aggregated state of a contract, or of every root contract.
    Summary {
        /// ID of the root contract.
        #[arg(long)]
        contract: Option<String>,
    },

    /// Payment window of an amendment, or all the windows of a root
    /// contract.
    Window {
        /// ID of the amendment.
        #[arg(long, conflicts_with = "contract")]
        amendment: Option<String>,

        /// ID of the root contract.
        #[arg(long, required_unless_present = "amendment")]
        contract: Option<String>,
    },

    /// Spending forecast of a root contract.
    Forecast {
        /// ID of the root contract.
        #[arg(long)]
        contract: String,
    },

    /// Manager and inspectors in charge of a root contract.
    Personnel {
        /// ID of the root contract.
        #[arg(long)]
        contract: String,

        /// Date to reconstruct the personnel as of (`YYYY-MM-DD`).
        #[arg(long)]
        as_of: Option<Date>,
    },

    /// Payment history and analytics of a root contract.
    Payments {
        /// ID of the root contract.
        #[arg(long)]
        contract: String,

        /// Year to break the consumption down by month for.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Lists every record the engine cannot derive data from.
    Validate,
}
