//! Display Config

use clap::Args;
use rusty_money::iso::{self, Currency};

/// Presentation settings.
#[derive(Debug, Args)]
pub struct DisplayConfig {
    /// ISO 4217 currency used to display prices
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "USD", value_parser = parse_currency)]
    pub currency: &'static Currency,
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    iso::find(&code.to_ascii_uppercase()).ok_or_else(|| format!("unknown currency code {code:?}"))
}
