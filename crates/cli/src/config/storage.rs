//! Storage Config

use std::path::PathBuf;

use clap::Args;
use storefront_app::context::StorageConfig;

/// Name of the state file inside the state directory.
pub const STATE_FILE: &str = "storefront.json";

/// Cart identity persistence settings.
#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Directory holding the persisted cart identifier
    #[arg(long, env = "STOREFRONT_STATE_DIR", default_value = ".storefront")]
    pub state_dir: PathBuf,

    /// Keep the cart identifier in memory only
    #[arg(long, env = "STOREFRONT_NO_PERSIST", default_value_t = false)]
    pub no_persist: bool,
}

impl StorageArgs {
    /// Storage backend for the cart identifier.
    #[must_use]
    pub fn storage_config(&self) -> StorageConfig {
        if self.no_persist {
            return StorageConfig::Memory;
        }

        StorageConfig::File(self.state_dir.join(STATE_FILE))
    }
}
