//! Backend Config

use std::time::Duration;

use clap::Args;
use storefront_app::http::HttpConfig;

/// Commerce backend settings.
#[derive(Debug, Args)]
pub struct BackendConfig {
    /// Backend base URL
    #[arg(long, env = "STOREFRONT_BACKEND_URL", default_value = "http://localhost:8080")]
    pub backend_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "STOREFRONT_REQUEST_TIMEOUT_SECS", default_value_t = 10_u64)]
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    /// HTTP client settings.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.backend_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
