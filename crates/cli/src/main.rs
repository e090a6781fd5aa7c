//! Storefront terminal client

use std::{
    error::Error,
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use tracing::{debug, error};

use storefront_app::context::{AppConfig, AppContext};

use crate::{
    commands::Session, config::CliConfig, errors::CliError, navigator::TerminalNavigator,
};

mod commands;
mod config;
mod errors;
mod navigator;
mod observability;
mod render;

/// Storefront terminal client entry point
#[tokio::main]
async fn main() -> ExitCode {
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(error) => {
            // Prints help and version requests too.
            error.print().ok();

            return ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(2));
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");
            report(&error);

            ExitCode::FAILURE
        }
    }
}

async fn run(config: CliConfig) -> Result<(), CliError> {
    observability::init(&config.logging)?;

    let app = AppConfig {
        backend: config.backend.http_config(),
        storage: config.storage.storage_config(),
    };

    debug!(backend = %app.backend.base_url, storage = ?app.storage, "starting");

    let ctx = AppContext::from_config(&app)?;
    let session = Session {
        ctx: &ctx,
        navigator: Arc::new(TerminalNavigator),
        currency: config.display.currency,
    };

    let mut out = io::stdout();

    commands::run(config.command, &session, &mut out).await?;

    out.flush()?;

    Ok(())
}

fn report(error: &CliError) {
    let mut err = io::stderr().lock();

    writeln!(err, "error: {error}").ok();

    let mut source = error.source();

    while let Some(cause) = source {
        writeln!(err, "  caused by: {cause}").ok();
        source = cause.source();
    }
}
