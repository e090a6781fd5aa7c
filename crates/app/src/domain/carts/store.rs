//! Cart store.
//!
//! Owns the client's copy of the cart. Every mutation is a request to the
//! backend followed by a wholesale replacement of the local snapshot with the
//! cart the backend returns; nothing is changed optimistically.
//!
//! Mutations draw a sequence number when issued. A response only replaces the
//! snapshot when its sequence number is newer than the one last applied, so
//! responses that arrive out of order never roll the cart back.
//!
//! Requests are addressed to the id of the cart the backend last returned.
//! When that id differs from the stored identity (a completed cart rolled
//! over to a new one), the store adopts it and persists it in place of the
//! old one.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use storefront::products::ProductId;

use crate::domain::{
    carts::{
        errors::{CartError, CartsServiceError},
        identity::{CartIdentity, CartIdentityResolver},
        models::{Cart, CartId, CartItemId, CartTotals, Quantity, QuantityRequest},
        service::CartsService,
        storage::CartIdStorage,
    },
    checkout::{CheckoutNavigator, CheckoutService, models::CheckoutSession},
};

/// Lifecycle of a [`CartStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartStatus {
    Uninitialized,
    Loading,
    Ready,
    /// The cart could not be loaded. The cart is unusable, not empty.
    LoadFailed(String),
}

/// Published store state.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSnapshot {
    pub status: CartStatus,
    pub identity: Option<CartIdentity>,
    pub cart: Option<Cart>,

    /// Sequence number of the last applied response.
    pub revision: u64,
}

impl CartSnapshot {
    fn uninitialized() -> Self {
        Self {
            status: CartStatus::Uninitialized,
            identity: None,
            cart: None,
            revision: 0,
        }
    }

    /// Derived totals of the current cart.
    pub fn totals(&self) -> Option<CartTotals> {
        self.cart.as_ref().map(Cart::totals)
    }
}

/// Result of an operation that completed successfully at the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The result was applied.
    Applied(T),

    /// A later operation was issued before this one completed; its result
    /// was discarded.
    Superseded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

/// Injected dependencies of a [`CartStore`].
#[derive(Clone)]
pub struct CartStoreDeps {
    pub carts: Arc<dyn CartsService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub storage: Arc<dyn CartIdStorage>,
    pub navigator: Arc<dyn CheckoutNavigator>,
}

/// The client's single source of truth for the cart.
pub struct CartStore {
    carts: Arc<dyn CartsService>,
    checkout: Arc<dyn CheckoutService>,
    navigator: Arc<dyn CheckoutNavigator>,
    identity: CartIdentityResolver,
    state: watch::Sender<CartSnapshot>,
    issued: AtomicU64,
}

impl Debug for CartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartStore")
            .field("state", &*self.state.borrow())
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CartStore {
    #[must_use]
    pub fn new(deps: CartStoreDeps) -> Self {
        Self {
            identity: CartIdentityResolver::new(deps.storage, Arc::clone(&deps.carts)),
            carts: deps.carts,
            checkout: deps.checkout,
            navigator: deps.navigator,
            state: watch::Sender::new(CartSnapshot::uninitialized()),
            issued: AtomicU64::new(0),
        }
    }

    /// Current published state.
    pub fn snapshot(&self) -> CartSnapshot {
        self.state.borrow().clone()
    }

    /// Current lifecycle status.
    pub fn status(&self) -> CartStatus {
        self.state.borrow().status.clone()
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.state.subscribe()
    }

    /// Derived totals of the current cart, when ready.
    pub fn totals(&self) -> Option<CartTotals> {
        let state = self.state.borrow();

        match state.status {
            CartStatus::Ready => state.totals(),
            _ => None,
        }
    }

    /// Resolve the cart identity and load the remote cart.
    ///
    /// Only the first call does any work; later calls return the current
    /// status.
    #[instrument(skip(self))]
    pub async fn init(&self) -> CartStatus {
        let started = self.state.send_if_modified(|state| {
            if state.status != CartStatus::Uninitialized {
                return false;
            }

            state.status = CartStatus::Loading;

            true
        });

        if !started {
            debug!("cart store already initialized");

            return self.status();
        }

        let identity = match self.identity.resolve_or_ephemeral().await {
            Ok(identity) => identity,
            Err(error) => {
                error!(%error, "failed to resolve cart identity");

                return self.load_failed(None, error.to_string());
            }
        };

        let sequence = self.issue();

        match self.carts.get_cart(identity.cart_id().clone()).await {
            Ok(cart) => {
                info!(cart = %cart.id, items = cart.items.len(), "cart loaded");

                let adopted = rolled_over(&identity, &cart);
                let identity = adopted.clone().unwrap_or(identity);

                self.state.send_modify(|state| {
                    state.status = CartStatus::Ready;
                    state.identity = Some(identity);
                    state.cart = Some(cart);
                    state.revision = state.revision.max(sequence);
                });

                if let Some(adopted) = adopted {
                    self.persist_adopted(adopted).await;
                }

                CartStatus::Ready
            }
            Err(error) => {
                error!(%error, cart = %identity.cart_id(), "failed to load cart");

                self.load_failed(Some(identity), error.to_string())
            }
        }
    }

    /// Add units of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a quantity below one and
    /// [`CartError::NotReady`] before the cart is loaded, both without a
    /// backend request. Backend failures leave the cart unchanged.
    #[instrument(skip_all, fields(product = %product, quantity))]
    pub async fn add_item(
        &self,
        product: ProductId,
        quantity: i64,
    ) -> Result<Outcome<Cart>, CartError> {
        let quantity = Quantity::try_from(quantity)?;
        let cart = self.ready_cart_id()?;
        let sequence = self.issue();

        let result = self.carts.add_item(cart, product, quantity).await;

        self.apply(sequence, result).await
    }

    /// Set the quantity of a line. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a negative quantity and
    /// [`CartError::NotReady`] before the cart is loaded, both without a
    /// backend request. Backend failures leave the cart unchanged.
    #[instrument(skip_all, fields(item = %item, quantity))]
    pub async fn update_item(
        &self,
        item: CartItemId,
        quantity: i64,
    ) -> Result<Outcome<Cart>, CartError> {
        let request = QuantityRequest::try_from(quantity)?;
        let cart = self.ready_cart_id()?;
        let sequence = self.issue();

        let result = self.carts.update_item(cart, item, request).await;

        self.apply(sequence, result).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// See [`CartStore::update_item`].
    pub async fn remove_item(&self, item: CartItemId) -> Result<Outcome<Cart>, CartError> {
        self.update_item(item, 0).await
    }

    /// Re-fetch the remote cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotReady`] before the cart is loaded. Backend
    /// failures leave the cart unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Outcome<Cart>, CartError> {
        let cart = self.ready_cart_id()?;
        let sequence = self.issue();

        let result = self.carts.get_cart(cart).await;

        self.apply(sequence, result).await
    }

    /// Request a checkout session and hand it to the navigator.
    ///
    /// The cart is left untouched in every outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] for an empty cart and
    /// [`CartError::NotReady`] before the cart is loaded, both without a
    /// backend request.
    #[instrument(skip(self))]
    pub async fn initiate_checkout(&self) -> Result<Outcome<CheckoutSession>, CartError> {
        let (cart, is_empty) = {
            let state = self.state.borrow();

            match (&state.status, &state.cart) {
                (CartStatus::Ready, Some(cart)) => (cart.id.clone(), cart.is_empty()),
                _ => return Err(CartError::NotReady),
            }
        };

        if is_empty {
            return Err(CartError::EmptyCart);
        }

        let sequence = self.issue();

        let session = self.checkout.initiate_checkout(cart).await?;

        if self.issued.load(Ordering::SeqCst) != sequence {
            warn!("cart changed while checkout was pending, not navigating");

            return Ok(Outcome::Superseded);
        }

        info!(url = %session.url, "handing over to checkout");

        self.navigator.navigate(&session);

        Ok(Outcome::Applied(session))
    }

    /// Clear the persisted cart identifier. The next store starts a new cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IdentityUnavailable`] when storage cannot be
    /// written.
    pub async fn forget_identity(&self) -> Result<(), CartError> {
        Ok(self.identity.forget().await?)
    }

    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn ready_cart_id(&self) -> Result<CartId, CartError> {
        let state = self.state.borrow();

        match (&state.status, &state.cart) {
            (CartStatus::Ready, Some(cart)) => Ok(cart.id.clone()),
            _ => Err(CartError::NotReady),
        }
    }

    async fn apply(
        &self,
        sequence: u64,
        result: Result<Cart, CartsServiceError>,
    ) -> Result<Outcome<Cart>, CartError> {
        let cart = result.inspect_err(|error| warn!(%error, sequence, "cart request failed"))?;
        let applied = cart.clone();
        let mut adopted = None;

        let fresh = self.state.send_if_modified(|state| {
            if sequence <= state.revision {
                return false;
            }

            adopted = state
                .identity
                .as_ref()
                .and_then(|identity| rolled_over(identity, &cart));

            if let Some(identity) = &adopted {
                state.identity = Some(identity.clone());
            }

            state.revision = sequence;
            state.cart = Some(cart);

            true
        });

        if !fresh {
            debug!(sequence, "discarding superseded cart response");

            return Ok(Outcome::Superseded);
        }

        if let Some(adopted) = adopted {
            self.persist_adopted(adopted).await;
        }

        debug!(sequence, items = applied.items.len(), "cart snapshot applied");

        Ok(Outcome::Applied(applied))
    }

    /// Store an identity adopted from a backend snapshot. A persisted identity
    /// that cannot be written continues as ephemeral.
    async fn persist_adopted(&self, identity: CartIdentity) {
        info!(cart = %identity.cart_id(), "backend reported a new cart id, adopting it");

        let CartIdentity::Persisted(id) = &identity else {
            return;
        };

        let Err(error) = self.identity.adopt(id).await else {
            return;
        };

        warn!(%error, cart = %id, "failed to persist new cart id, using an ephemeral cart");

        self.state.send_if_modified(|state| {
            if state.identity.as_ref() != Some(&identity) {
                return false;
            }

            state.identity = Some(CartIdentity::Ephemeral(id.clone()));

            true
        });
    }

    fn load_failed(&self, identity: Option<CartIdentity>, reason: String) -> CartStatus {
        let status = CartStatus::LoadFailed(reason);

        self.state.send_modify(|state| {
            state.status = status.clone();
            state.identity = identity;
            state.cart = None;
        });

        status
    }
}

/// The identity to adopt when `cart` carries a different id than `identity`.
fn rolled_over(identity: &CartIdentity, cart: &Cart) -> Option<CartIdentity> {
    (identity.cart_id() != &cart.id).then(|| identity.with_cart_id(cart.id.clone()))
}

#[cfg(test)]
mod tests {
    use std::io;

    use rust_decimal::Decimal;
    use testresult::TestResult;
    use tokio::sync::{mpsc, oneshot};

    use crate::{
        domain::{
            carts::{
                identity::CART_ID_KEY,
                service::MockCartsService,
                storage::{DisabledStorage, MemoryStorage},
            },
            checkout::{CheckoutServiceError, MockCheckoutNavigator, MockCheckoutService},
        },
        http::HttpError,
        test::{GatedCarts, GatedCheckout, make_cart},
    };

    use super::*;

    fn strict_checkout() -> MockCheckoutService {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_initiate_checkout().never();

        checkout
    }

    fn strict_navigator() -> MockCheckoutNavigator {
        let mut navigator = MockCheckoutNavigator::new();

        navigator.expect_navigate().never();

        navigator
    }

    fn transport_error() -> HttpError {
        HttpError::Transport(Box::new(io::Error::from(io::ErrorKind::ConnectionReset)))
    }

    /// A carts mock that serves `cart` on load and nothing else by default.
    fn loading(cart: Cart) -> MockCartsService {
        let mut carts = MockCartsService::new();
        let id = cart.id.clone();

        carts.expect_create_cart().never();
        carts
            .expect_get_cart()
            .withf(move |requested| requested == &id)
            .once()
            .return_once(move |_| Ok(cart));

        carts
    }

    async fn persisted(id: &str) -> TestResult<Arc<MemoryStorage>> {
        let storage = Arc::new(MemoryStorage::new());

        storage.set(CART_ID_KEY, id.to_string()).await?;

        Ok(storage)
    }

    fn store(
        carts: MockCartsService,
        checkout: MockCheckoutService,
        navigator: MockCheckoutNavigator,
        storage: Arc<dyn CartIdStorage>,
    ) -> CartStore {
        CartStore::new(CartStoreDeps {
            carts: Arc::new(carts),
            checkout: Arc::new(checkout),
            storage,
            navigator: Arc::new(navigator),
        })
    }

    async fn ready_store(
        carts: MockCartsService,
        checkout: MockCheckoutService,
        navigator: MockCheckoutNavigator,
    ) -> TestResult<CartStore> {
        let store = store(carts, checkout, navigator, persisted("cart-1").await?);

        assert_eq!(store.init().await, CartStatus::Ready);

        Ok(store)
    }

    #[tokio::test]
    async fn init_loads_persisted_cart() -> TestResult {
        let cart = make_cart("cart-1", &[("line-1", "mug", 2, 10)]);
        let store =
            ready_store(loading(cart.clone()), strict_checkout(), strict_navigator()).await?;

        let snapshot = store.snapshot();

        assert_eq!(snapshot.status, CartStatus::Ready);
        assert_eq!(snapshot.cart, Some(cart));
        assert_eq!(
            snapshot.identity,
            Some(CartIdentity::Persisted(CartId::new("cart-1")))
        );

        Ok(())
    }

    #[tokio::test]
    async fn second_init_is_a_no_op() -> TestResult {
        let cart = make_cart("cart-1", &[]);
        let store = ready_store(loading(cart), strict_checkout(), strict_navigator()).await?;

        assert_eq!(store.init().await, CartStatus::Ready);

        Ok(())
    }

    #[tokio::test]
    async fn identity_persists_across_sequential_initializations() -> TestResult {
        let storage: Arc<dyn CartIdStorage> = Arc::new(MemoryStorage::new());

        let mut first = MockCartsService::new();

        first
            .expect_create_cart()
            .once()
            .return_once(|| Ok(CartId::new("cart-new")));
        first
            .expect_get_cart()
            .once()
            .return_once(|id| Ok(Cart::empty(id)));

        let store_one = store(first, strict_checkout(), strict_navigator(), Arc::clone(&storage));

        assert_eq!(store_one.init().await, CartStatus::Ready);

        let mut second = MockCartsService::new();

        second.expect_create_cart().never();
        second
            .expect_get_cart()
            .withf(|id| id.as_str() == "cart-new")
            .once()
            .return_once(|id| Ok(Cart::empty(id)));

        let store_two = store(second, strict_checkout(), strict_navigator(), storage);

        assert_eq!(store_two.init().await, CartStatus::Ready);
        assert_eq!(
            store_two.snapshot().identity,
            Some(CartIdentity::Persisted(CartId::new("cart-new")))
        );

        Ok(())
    }

    #[tokio::test]
    async fn load_failure_exposes_no_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_create_cart().never();
        carts
            .expect_get_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::Unavailable(transport_error())));

        let store = store(carts, strict_checkout(), strict_navigator(), persisted("cart-1").await?);

        let status = store.init().await;

        assert!(
            matches!(status, CartStatus::LoadFailed(_)),
            "expected LoadFailed, got {status:?}"
        );
        assert_eq!(store.snapshot().cart, None, "a failed load is not an empty cart");
        assert_eq!(store.totals(), None);

        let result = store.add_item(ProductId::new("mug"), 1).await;

        assert!(
            matches!(result, Err(CartError::NotReady)),
            "expected NotReady, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn disabled_storage_uses_ephemeral_cart() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_create_cart()
            .once()
            .return_once(|| Ok(CartId::new("cart-tmp")));
        carts
            .expect_get_cart()
            .once()
            .return_once(|id| Ok(Cart::empty(id)));

        let store = store(carts, strict_checkout(), strict_navigator(), Arc::new(DisabledStorage));

        assert_eq!(store.init().await, CartStatus::Ready);
        assert_eq!(
            store.snapshot().identity,
            Some(CartIdentity::Ephemeral(CartId::new("cart-tmp")))
        );

        Ok(())
    }

    #[tokio::test]
    async fn operations_before_init_fail_without_requests() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_create_cart().never();
        carts.expect_get_cart().never();
        carts.expect_add_item().never();
        carts.expect_update_item().never();

        let store = store(carts, strict_checkout(), strict_navigator(), persisted("cart-1").await?);

        assert!(
            matches!(store.add_item(ProductId::new("mug"), 1).await, Err(CartError::NotReady)),
            "add before init"
        );
        assert!(
            matches!(store.remove_item(CartItemId::new("line-1")).await, Err(CartError::NotReady)),
            "remove before init"
        );
        assert!(
            matches!(store.refresh().await, Err(CartError::NotReady)),
            "refresh before init"
        );
        assert!(
            matches!(store.initiate_checkout().await, Err(CartError::NotReady)),
            "checkout before init"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_replaces_cart_with_backend_snapshot() -> TestResult {
        let initial = make_cart("cart-1", &[]);
        let returned = make_cart("cart-1", &[("line-1", "mug", 2, 10), ("line-2", "tea", 1, 5)]);
        let mut carts = loading(initial);

        let expected = returned.clone();

        carts
            .expect_add_item()
            .withf(|cart, product, quantity| {
                cart.as_str() == "cart-1" && product.as_str() == "mug" && quantity.get() == 2
            })
            .once()
            .return_once(move |_, _, _| Ok(returned));

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        let outcome = store.add_item(ProductId::new("mug"), 2).await?;

        assert_eq!(outcome, Outcome::Applied(expected.clone()));
        assert_eq!(store.snapshot().cart, Some(expected));

        let totals = store.totals().ok_or("Expected totals")?;

        assert_eq!(totals.subtotal, Decimal::from(25));
        assert_eq!(totals.tax, Decimal::new(25, 1));
        assert_eq!(totals.total, Decimal::new(275, 1));

        Ok(())
    }

    #[tokio::test]
    async fn add_item_rejects_non_positive_quantity_without_request() -> TestResult {
        let mut carts = loading(make_cart("cart-1", &[]));

        carts.expect_add_item().never();

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        for quantity in [0, -3] {
            let result = store.add_item(ProductId::new("mug"), quantity).await;

            assert!(
                matches!(result, Err(CartError::InvalidQuantity(_))),
                "expected InvalidQuantity for {quantity}, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn failed_add_leaves_cart_unchanged() -> TestResult {
        let initial = make_cart("cart-1", &[("line-1", "mug", 1, 10)]);
        let mut carts = loading(initial.clone());

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| Err(CartsServiceError::Unavailable(transport_error())));

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        let result = store.add_item(ProductId::new("tea"), 1).await;

        assert!(
            matches!(result, Err(CartError::Unavailable(HttpError::Transport(_)))),
            "expected Unavailable, got {result:?}"
        );
        assert_eq!(store.snapshot().cart, Some(initial));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_add_surfaces_backend_reason() -> TestResult {
        let mut carts = loading(make_cart("cart-1", &[]));

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _, _| {
                Err(CartsServiceError::Rejected("Insufficient stock".to_string()))
            });

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        let result = store.add_item(ProductId::new("lantern"), 1).await;

        assert!(
            matches!(&result, Err(CartError::CartRejected(reason)) if reason == "Insufficient stock"),
            "expected CartRejected, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_to_zero_is_sent_as_removal() -> TestResult {
        let mut carts = loading(make_cart("cart-1", &[("line-1", "mug", 2, 10)]));

        carts.expect_add_item().never();
        carts
            .expect_update_item()
            .withf(|_, item, request| {
                item.as_str() == "line-1" && *request == QuantityRequest::Remove
            })
            .once()
            .return_once(|cart, _, _| Ok(Cart::empty(cart)));

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        store.update_item(CartItemId::new("line-1"), 0).await?;

        let cart = store.snapshot().cart.ok_or("Expected a cart")?;

        assert!(cart.is_empty(), "line should be gone, got {cart:?}");

        Ok(())
    }

    #[tokio::test]
    async fn negative_update_is_rejected_without_request() -> TestResult {
        let mut carts = loading(make_cart("cart-1", &[("line-1", "mug", 2, 10)]));

        carts.expect_update_item().never();

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        let result = store.update_item(CartItemId::new("line-1"), -1).await;

        assert!(
            matches!(result, Err(CartError::InvalidQuantity(_))),
            "expected InvalidQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot() -> TestResult {
        let mut carts = MockCartsService::new();
        let remote = make_cart("cart-1", &[("line-9", "tea", 4, 5)]);
        let expected = remote.clone();
        let mut calls = 0;

        carts.expect_get_cart().times(2).returning(move |id| {
            calls += 1;

            if calls == 1 {
                Ok(Cart::empty(id))
            } else {
                Ok(remote.clone())
            }
        });

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;

        assert_eq!(store.refresh().await?, Outcome::Applied(expected.clone()));
        assert_eq!(store.snapshot().cart, Some(expected));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_fails_without_request() -> TestResult {
        let store = ready_store(
            loading(make_cart("cart-1", &[])),
            strict_checkout(),
            strict_navigator(),
        )
        .await?;

        let result = store.initiate_checkout().await;

        assert!(
            matches!(result, Err(CartError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn checkout_hands_session_to_navigator() -> TestResult {
        let cart = make_cart("cart-1", &[("line-1", "mug", 1, 10)]);
        let session = CheckoutSession {
            url: "https://pay.example.test/session/cart-1".to_string(),
            checkout_id: None,
        };

        let mut checkout = MockCheckoutService::new();
        let returned = session.clone();

        checkout
            .expect_initiate_checkout()
            .withf(|cart| cart.as_str() == "cart-1")
            .once()
            .return_once(move |_| Ok(returned));

        let mut navigator = MockCheckoutNavigator::new();
        let expected_url = session.url.clone();

        navigator
            .expect_navigate()
            .withf(move |session| session.url == expected_url)
            .once()
            .return_const(());

        let store = ready_store(loading(cart.clone()), checkout, navigator).await?;

        assert_eq!(store.initiate_checkout().await?, Outcome::Applied(session));
        assert_eq!(store.snapshot().cart, Some(cart), "checkout leaves the cart alone");

        Ok(())
    }

    #[tokio::test]
    async fn rejected_checkout_does_not_navigate() -> TestResult {
        let cart = make_cart("cart-1", &[("line-1", "kettle", 1, 45)]);
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_initiate_checkout()
            .once()
            .return_once(|_| {
                Err(CheckoutServiceError::Rejected(
                    "Stovetop Kettle is out of stock".to_string(),
                ))
            });

        let store = ready_store(loading(cart.clone()), checkout, strict_navigator()).await?;

        let result = store.initiate_checkout().await;

        assert!(
            matches!(&result, Err(CartError::CartRejected(reason)) if reason.contains("out of stock")),
            "expected CartRejected, got {result:?}"
        );
        assert_eq!(store.snapshot().cart, Some(cart));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_outage_is_checkout_unavailable() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_initiate_checkout()
            .once()
            .return_once(|_| Err(CheckoutServiceError::Unavailable(transport_error())));

        let store = ready_store(
            loading(make_cart("cart-1", &[("line-1", "mug", 1, 10)])),
            checkout,
            strict_navigator(),
        )
        .await?;

        let result = store.initiate_checkout().await;

        assert!(
            matches!(result, Err(CartError::CheckoutUnavailable(_))),
            "expected CheckoutUnavailable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn late_response_of_earlier_mutation_is_discarded() -> TestResult {
        let initial = make_cart("cart-1", &[("line-1", "mug", 1, 10)]);
        let after_first = make_cart("cart-1", &[("line-1", "mug", 1, 10), ("line-2", "tea", 1, 5)]);
        let after_second = make_cart(
            "cart-1",
            &[("line-1", "mug", 3, 10), ("line-2", "tea", 1, 5)],
        );

        let (started_tx, mut started) = mpsc::unbounded_channel();
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();

        let carts = GatedCarts::new(initial, started_tx, vec![first_rx, second_rx]);

        let store = Arc::new(CartStore::new(CartStoreDeps {
            carts: Arc::new(carts),
            checkout: Arc::new(strict_checkout()),
            storage: persisted("cart-1").await?,
            navigator: Arc::new(strict_navigator()),
        }));

        assert_eq!(store.init().await, CartStatus::Ready);

        let first = tokio::spawn({
            let store = Arc::clone(&store);

            async move { store.add_item(ProductId::new("tea"), 1).await }
        });

        started
            .recv()
            .await
            .ok_or("first mutation never reached the backend")?;

        let second = tokio::spawn({
            let store = Arc::clone(&store);

            async move { store.update_item(CartItemId::new("line-1"), 3).await }
        });

        started
            .recv()
            .await
            .ok_or("second mutation never reached the backend")?;

        second_tx
            .send(Ok(after_second.clone()))
            .map_err(|_| "second gate closed")?;

        assert_eq!(second.await??, Outcome::Applied(after_second.clone()));

        first_tx
            .send(Ok(after_first))
            .map_err(|_| "first gate closed")?;

        assert_eq!(first.await??, Outcome::Superseded);
        assert_eq!(store.snapshot().cart, Some(after_second));
        assert_eq!(store.snapshot().revision, 3);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_is_superseded_by_later_mutation() -> TestResult {
        let initial = make_cart("cart-1", &[("line-1", "mug", 1, 10)]);
        let (started_tx, mut started) = mpsc::unbounded_channel();
        let (add_tx, add_rx) = oneshot::channel();

        let carts = GatedCarts::new(initial.clone(), started_tx, vec![add_rx]);

        let (checkout_started_tx, mut checkout_started) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = oneshot::channel();

        let checkout = Arc::new(GatedCheckout::new(
            CheckoutSession {
                url: "https://pay.example.test/session/cart-1".to_string(),
                checkout_id: None,
            },
            checkout_started_tx,
            release_rx,
        ));

        let store = Arc::new(CartStore::new(CartStoreDeps {
            carts: Arc::new(carts),
            checkout,
            storage: persisted("cart-1").await?,
            navigator: Arc::new(strict_navigator()),
        }));

        assert_eq!(store.init().await, CartStatus::Ready);

        let pending_checkout = tokio::spawn({
            let store = Arc::clone(&store);

            async move { store.initiate_checkout().await }
        });

        checkout_started
            .recv()
            .await
            .ok_or("checkout never reached the backend")?;

        let add = tokio::spawn({
            let store = Arc::clone(&store);

            async move { store.add_item(ProductId::new("tea"), 1).await }
        });

        started.recv().await.ok_or("add never reached the backend")?;

        release_tx.send(()).map_err(|()| "checkout gate closed")?;

        assert_eq!(pending_checkout.await??, Outcome::Superseded);

        add_tx.send(Ok(initial)).map_err(|_| "add gate closed")?;
        add.await??;

        Ok(())
    }

    #[tokio::test]
    async fn rolled_over_cart_id_is_adopted_and_persisted() -> TestResult {
        let storage = persisted("cart-1").await?;
        let mut carts = MockCartsService::new();

        carts.expect_create_cart().never();
        carts
            .expect_get_cart()
            .withf(|id| id.as_str() == "cart-1")
            .once()
            .return_once(|_| Ok(make_cart("cart-2", &[])));
        carts
            .expect_add_item()
            .withf(|cart, _, _| cart.as_str() == "cart-2")
            .once()
            .return_once(|cart, _, _| Ok(make_cart(cart.as_str(), &[("line-1", "mug", 1, 10)])));

        let store = store(carts, strict_checkout(), strict_navigator(), storage.clone());

        assert_eq!(store.init().await, CartStatus::Ready);
        assert_eq!(
            store.snapshot().identity,
            Some(CartIdentity::Persisted(CartId::new("cart-2")))
        );
        assert_eq!(storage.get(CART_ID_KEY).await?.as_deref(), Some("cart-2"));

        let cart = store
            .add_item(ProductId::new("mug"), 1)
            .await?
            .applied()
            .ok_or("Expected the add to apply")?;

        assert_eq!(cart.id, CartId::new("cart-2"));

        Ok(())
    }

    #[tokio::test]
    async fn cart_id_changed_by_refresh_is_used_for_checkout() -> TestResult {
        let storage = persisted("cart-1").await?;
        let mut carts = MockCartsService::new();
        let mut calls = 0;

        carts.expect_get_cart().times(2).returning(move |id| {
            calls += 1;

            if calls == 1 {
                Ok(make_cart(id.as_str(), &[("line-1", "mug", 1, 10)]))
            } else {
                Ok(make_cart("cart-3", &[("line-7", "tea", 1, 5)]))
            }
        });

        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_initiate_checkout()
            .withf(|cart| cart.as_str() == "cart-3")
            .once()
            .return_once(|_| {
                Ok(CheckoutSession {
                    url: "https://pay.example.test/session/cart-3".to_string(),
                    checkout_id: None,
                })
            });

        let mut navigator = MockCheckoutNavigator::new();

        navigator.expect_navigate().once().return_const(());

        let store = store(carts, checkout, navigator, storage.clone());

        assert_eq!(store.init().await, CartStatus::Ready);

        store.refresh().await?;

        assert_eq!(storage.get(CART_ID_KEY).await?.as_deref(), Some("cart-3"));
        assert!(
            !store.initiate_checkout().await?.is_superseded(),
            "checkout should hand off"
        );

        Ok(())
    }

    #[tokio::test]
    async fn ephemeral_identity_adopts_new_id_without_storage() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_create_cart()
            .once()
            .return_once(|| Ok(CartId::new("cart-tmp")));
        carts
            .expect_get_cart()
            .once()
            .return_once(|_| Ok(make_cart("cart-next", &[])));

        let store = store(carts, strict_checkout(), strict_navigator(), Arc::new(DisabledStorage));

        assert_eq!(store.init().await, CartStatus::Ready);
        assert_eq!(
            store.snapshot().identity,
            Some(CartIdentity::Ephemeral(CartId::new("cart-next")))
        );

        Ok(())
    }

    #[tokio::test]
    async fn forget_identity_clears_storage() -> TestResult {
        let storage = persisted("cart-1").await?;
        let store = store(
            loading(make_cart("cart-1", &[])),
            strict_checkout(),
            strict_navigator(),
            storage.clone(),
        );

        store.init().await;
        store.forget_identity().await?;

        assert_eq!(storage.get(CART_ID_KEY).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn subscribers_observe_applied_snapshots() -> TestResult {
        let mut carts = loading(make_cart("cart-1", &[]));
        let returned = make_cart("cart-1", &[("line-1", "mug", 1, 10)]);
        let expected = returned.clone();

        carts
            .expect_add_item()
            .once()
            .return_once(move |_, _, _| Ok(returned));

        let store = ready_store(carts, strict_checkout(), strict_navigator()).await?;
        let mut updates = store.subscribe();

        store.add_item(ProductId::new("mug"), 1).await?;

        assert!(updates.has_changed()?, "subscriber should be notified");
        assert_eq!(updates.borrow_and_update().cart, Some(expected));

        Ok(())
    }
}
