//! Client configuration module

use clap::Parser;

use crate::{
    commands::Command,
    config::{
        backend::BackendConfig, display::DisplayConfig, observability::LoggingConfig,
        storage::StorageArgs,
    },
};

pub(crate) mod backend;
pub(crate) mod display;
pub(crate) mod observability;
pub(crate) mod storage;

/// Storefront terminal client configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront terminal client", long_about = None)]
pub struct CliConfig {
    /// Commerce backend settings.
    #[command(flatten)]
    pub backend: BackendConfig,

    /// Cart identity persistence settings.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Presentation settings.
    #[command(flatten)]
    pub display: DisplayConfig,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
