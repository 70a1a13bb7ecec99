use std::{fs, io, process::ExitCode, sync::OnceLock};

use application::{
    args::Command, render, report, Args, AsError as _, Config,
};
use common::Date;
use service::{
    infra::{Document, Store},
    Service,
};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO)
                            >= *meta.level()
                })),
        )
        .init();

    match start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

fn start() -> Result<(), ()> {
    let Args {
        config,
        document,
        today,
        command,
    } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let Config { service, log } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let json = fs::read_to_string(&document).map_err(|e| {
        log::error!("failed to read `{document}`: {}", e.into_error());
    })?;
    let store = Store::from(Document::from_json(&json).map_err(|e| {
        log::error!("failed to decode `{document}`: {}", e.into_error());
    })?);
    log::debug!("loaded {} records from `{document}`", store.contracts().len());

    let service = Service::new(service.into());
    let today = today
        .unwrap_or_else(|| Date::from(time::OffsetDateTime::now_utc().date()));
    let snapshot = store.snapshot();

    let (output, valid) = if let Command::Validate = command {
        let validation = report::validate(&service, &snapshot, today);
        (report::to_json(&validation), validation.valid)
    } else {
        (render(&service, &snapshot, today, &command), true)
    };
    let output = output.map_err(|e| {
        log::error!("failed to report: {e}");
    })?;
    println!("{output}");

    valid.then_some(()).ok_or(())
}
