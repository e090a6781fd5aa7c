//! Terminal rendering

use std::{io, ops::Range};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, Theme, object::Columns},
};

use storefront::prelude::*;
use storefront_app::domain::checkout::models::CheckoutSession;

fn money(amount: Decimal, currency: &Currency) -> String {
    format!("{}", Money::from_decimal(amount, currency))
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: Range<usize>,
) -> io::Result<()> {
    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Columns::new(numeric), Alignment::right());

    writeln!(out, "{table}")
}

/// Write the catalog as a table.
pub fn write_products(
    out: &mut impl io::Write,
    products: &[Product],
    currency: &Currency,
) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "The catalog is empty.");
    }

    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Price", "Options"]);

    for product in products {
        let options = product
            .variants
            .iter()
            .map(|variant| variant.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            money(product.price, currency),
            options,
        ]);
    }

    write_table(out, builder, 2..3)
}

/// Write a single product's details.
pub fn write_product(
    out: &mut impl io::Write,
    product: &Product,
    currency: &Currency,
) -> io::Result<()> {
    writeln!(out, "{} ({})", product.name, product.id)?;
    writeln!(out, "Price: {}", money(product.price, currency))?;

    if let Some(description) = &product.description {
        writeln!(out, "\n{description}")?;
    }

    for variant in &product.variants {
        writeln!(out, "{}: {}", variant.name, variant.options.join(" / "))?;
    }

    for image in &product.images {
        match &image.alt {
            Some(alt) => writeln!(out, "Image: {} ({alt})", image.url)?,
            None => writeln!(out, "Image: {}", image.url)?,
        }
    }

    Ok(())
}

/// Write cart lines followed by the derived totals.
pub fn write_cart(out: &mut impl io::Write, cart: &Cart, currency: &Currency) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart {} is empty.", cart.id);
    }

    let mut builder = Builder::default();

    builder.push_record(["Line", "Product", "Qty", "Unit price", "Line total"]);

    for item in &cart.items {
        builder.push_record([
            item.id.to_string(),
            item.product.name.clone(),
            item.quantity.to_string(),
            money(item.product.price, currency),
            money(item.line_total(), currency),
        ]);
    }

    writeln!(out, "Cart {} ({} items)", cart.id, cart.item_count())?;
    write_table(out, builder, 2..5)?;
    write_totals(out, cart.totals(), currency)
}

/// Write subtotal, tax and total.
pub fn write_totals(
    out: &mut impl io::Write,
    totals: CartTotals,
    currency: &Currency,
) -> io::Result<()> {
    let totals = totals.to_money(currency);
    let rows = [
        ("Subtotal:", totals.subtotal.to_string()),
        ("Tax:", totals.tax.to_string()),
        ("Total:", totals.total.to_string()),
    ];
    let width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in rows {
        writeln!(out, "{label:>10} {value:>width$}")?;
    }

    Ok(())
}

/// Write the payment hand-off.
pub fn write_checkout(out: &mut impl io::Write, session: &CheckoutSession) -> io::Result<()> {
    if let Some(checkout) = &session.checkout_id {
        writeln!(out, "Checkout {checkout} created.")?;
    }

    writeln!(out, "Continue to payment: {}", session.url)
}
