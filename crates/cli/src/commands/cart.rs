//! Cart commands

use std::{io, sync::Arc};

use clap::Subcommand;

use storefront::{carts::CartItemId, products::ProductId};
use storefront_app::domain::carts::{CartError, CartStatus, CartStore, Outcome};

use crate::{commands::Session, errors::CliError, render};

/// Cart commands.
#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Show the cart and its totals
    Show,

    /// Add units of a product
    Add {
        /// Product identifier
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Set the quantity of a line; zero removes it
    Update {
        /// Line identifier
        item_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a line
    Remove {
        /// Line identifier
        item_id: String,
    },

    /// Forget the persisted cart; the next command starts a new one
    Forget,
}

/// Create a cart store and wait for its cart to load.
pub(super) async fn open(session: &Session<'_>) -> Result<CartStore, CliError> {
    let store = session.ctx.cart_store(Arc::clone(&session.navigator));

    match store.init().await {
        CartStatus::Ready => Ok(store),
        CartStatus::LoadFailed(reason) => Err(CliError::CartLoad(reason)),
        CartStatus::Uninitialized | CartStatus::Loading => Err(CartError::NotReady.into()),
    }
}

pub(super) async fn run(
    command: CartCommand,
    session: &Session<'_>,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    if let CartCommand::Forget = command {
        let store = session.ctx.cart_store(Arc::clone(&session.navigator));

        store.forget_identity().await?;

        writeln!(out, "Cart forgotten.")?;

        return Ok(());
    }

    let store = open(session).await?;

    let outcome = match command {
        CartCommand::Show | CartCommand::Forget => None,
        CartCommand::Add {
            product_id,
            quantity,
        } => Some(store.add_item(ProductId::new(product_id), quantity).await?),
        CartCommand::Update { item_id, quantity } => {
            Some(store.update_item(CartItemId::new(item_id), quantity).await?)
        }
        CartCommand::Remove { item_id } => Some(store.remove_item(CartItemId::new(item_id)).await?),
    };

    if outcome.as_ref().is_some_and(Outcome::is_superseded) {
        writeln!(out, "The cart changed while this update was pending.")?;
    }

    let snapshot = store.snapshot();

    if let Some(identity) = snapshot.identity.as_ref().filter(|identity| !identity.is_persisted()) {
        writeln!(
            out,
            "Cart {} could not be saved locally and will not be resumed.",
            identity.cart_id()
        )?;
    }

    if let Some(cart) = &snapshot.cart {
        render::write_cart(out, cart, session.currency)?;
    }

    Ok(())
}
