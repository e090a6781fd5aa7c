//! Checkout hand-off for a terminal session.

use std::io::{self, Write};

use tracing::warn;

use storefront_app::domain::checkout::{CheckoutNavigator, models::CheckoutSession};

use crate::render;

/// Prints the payment page location for the shopper to open.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl CheckoutNavigator for TerminalNavigator {
    fn navigate(&self, session: &CheckoutSession) {
        let mut out = io::stdout().lock();

        if let Err(error) = render::write_checkout(&mut out, session).and_then(|()| out.flush()) {
            warn!(%error, url = %session.url, "failed to print checkout url");
        }
    }
}
