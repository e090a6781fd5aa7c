//! Checkout navigation.

use mockall::automock;

use crate::domain::checkout::models::CheckoutSession;

/// Hands the shopper over to a hosted payment page.
#[automock]
pub trait CheckoutNavigator: Send + Sync {
    fn navigate(&self, session: &CheckoutSession);
}
