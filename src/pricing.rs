//! Pricing

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::carts::CartItem;

/// Fixed sales tax applied to every cart subtotal.
pub fn tax_rate() -> Percentage {
    Percentage::from(Decimal::new(10, 2))
}

/// Derived cart totals. Never stored; recomputed from the lines on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line totals
    pub subtotal: Decimal,

    /// Tax on the subtotal
    pub tax: Decimal,

    /// Subtotal plus tax
    pub total: Decimal,
}

impl CartTotals {
    /// Calculate totals for the given lines.
    pub fn from_items(items: &[CartItem]) -> Self {
        let subtotal = items.iter().map(CartItem::line_total).sum::<Decimal>();
        let tax = tax_rate() * subtotal;

        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Express the totals in a display currency.
    pub fn to_money(self, currency: &Currency) -> MoneyTotals<'_> {
        MoneyTotals {
            subtotal: Money::from_decimal(self.subtotal, currency),
            tax: Money::from_decimal(self.tax, currency),
            total: Money::from_decimal(self.total, currency),
        }
    }
}

/// Cart totals in a display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyTotals<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Tax on the subtotal
    pub tax: Money<'a, Currency>,

    /// Subtotal plus tax
    pub total: Money<'a, Currency>,
}
