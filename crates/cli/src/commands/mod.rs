//! Client commands

use std::{io, sync::Arc};

use clap::Subcommand;
use rusty_money::iso::Currency;

use storefront_app::{context::AppContext, domain::checkout::CheckoutNavigator};

use crate::errors::CliError;

mod cart;
mod checkout;
mod products;

pub use cart::CartCommand;
pub use products::ProductsCommand;

/// Top-level client commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the catalog
    #[command(subcommand)]
    Products(ProductsCommand),

    /// Inspect and change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Hand the current cart over to the hosted payment page
    Checkout,
}

/// What a command runs against.
pub struct Session<'a> {
    /// Backend services and storage
    pub ctx: &'a AppContext,

    /// Receives the payment session on checkout
    pub navigator: Arc<dyn CheckoutNavigator>,

    /// Display currency
    pub currency: &'static Currency,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

/// Run a command, writing its output to `out`.
///
/// # Errors
///
/// Returns an error when the backend or local storage fails, or when output
/// cannot be written.
pub async fn run(
    command: Command,
    session: &Session<'_>,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    match command {
        Command::Products(command) => products::run(command, session, out).await,
        Command::Cart(command) => cart::run(command, session, out).await,
        Command::Checkout => checkout::run(session, out).await,
    }
}
