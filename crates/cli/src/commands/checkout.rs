//! Checkout command

use std::io;

use storefront_app::domain::carts::Outcome;

use crate::{
    commands::{Session, cart},
    errors::CliError,
};

pub(super) async fn run(session: &Session<'_>, out: &mut impl io::Write) -> Result<(), CliError> {
    let store = cart::open(session).await?;

    // The navigator prints the payment location itself.
    if let Outcome::Superseded = store.initiate_checkout().await? {
        writeln!(out, "The cart changed before checkout completed; run checkout again.")?;
    }

    Ok(())
}
