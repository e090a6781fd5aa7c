//! Catalog commands

use std::{io, path::PathBuf};

use clap::Subcommand;
use tokio::fs;
use tracing::info;

use storefront::products::ProductId;

use crate::{commands::Session, errors::CliError, render};

/// Catalog commands.
#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List every product
    List,

    /// Show a product's details
    Show {
        /// Product identifier
        product_id: String,
    },

    /// Download a product's primary image
    Image {
        /// Product identifier
        product_id: String,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub(super) async fn run(
    command: ProductsCommand,
    session: &Session<'_>,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let products = &session.ctx.products;

    match command {
        ProductsCommand::List => {
            let catalog = products.list_products().await?;

            render::write_products(out, &catalog, session.currency)?;
        }
        ProductsCommand::Show { product_id } => {
            let product = products.get_product(ProductId::new(product_id)).await?;

            render::write_product(out, &product, session.currency)?;
        }
        ProductsCommand::Image { product_id, output } => {
            let image = products.get_product_image(ProductId::new(product_id)).await?;

            fs::write(&output, &image.bytes)
                .await
                .map_err(|source| CliError::SaveImage {
                    path: output.clone(),
                    source,
                })?;

            info!(path = %output.display(), bytes = image.bytes.len(), "image saved");

            writeln!(
                out,
                "Saved {} bytes ({}) to {}",
                image.bytes.len(),
                image.content_type.as_deref().unwrap_or("unknown type"),
                output.display()
            )?;
        }
    }

    Ok(())
}
