//! Store
//!
//! [`StoreState`] owns every document the engine works with (catalog, carts,
//! orders, inventory audit log) and is the explicit transaction/session
//! object: every operation takes it by reference instead of reaching for an
//! ambient database handle, so a whole checkout composes under one atomic
//! boundary and tests can run against a bare state.
//!
//! [`Storefront`] is the shared, thread-safe handle. A write lock is held for
//! the full duration of any mutation, which makes `create_order`
//! serializable with respect to every other mutation touching the same cart
//! or the same product's stock counters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::Cart,
    checkout::{
        CheckoutRequest,
        coordinator::{self, CheckoutError, OrderReceipt},
    },
    identity::{Identity, UserId},
    inventory::{self, InventoryChange, LineReservation},
    money::Clp,
    orders::{Order, OrderKey, number::DEFAULT_PREFIX},
    products::{Product, ProductKey},
};

/// Default number of orders returned by order-history queries.
pub const DEFAULT_ORDER_HISTORY_LIMIT: usize = 20;

/// Errors from the persistence layer.
///
/// The in-memory store is infallible, so this crate never raises one; the
/// kind exists so checkout callers match on the full closed error set, and
/// fallible backends have a place to surface transient failures. A failed
/// checkout leaves no partial state, so retrying after one is always safe.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend rejected or lost a write.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Every document the engine owns, behind one session.
#[derive(Debug)]
pub struct StoreState {
    catalog: SlotMap<ProductKey, Product>,
    carts: FxHashMap<Identity, Cart>,
    orders: SlotMap<OrderKey, Order>,
    inventory_log: Vec<InventoryChange>,
    order_prefix: String,
}

impl StoreState {
    /// Creates an empty state with the default order-number prefix.
    pub fn new() -> Self {
        Self::with_order_prefix(DEFAULT_PREFIX)
    }

    /// Creates an empty state with a custom two-character store prefix.
    pub fn with_order_prefix(prefix: impl Into<String>) -> Self {
        StoreState {
            catalog: SlotMap::with_key(),
            carts: FxHashMap::default(),
            orders: SlotMap::with_key(),
            inventory_log: Vec::new(),
            order_prefix: prefix.into(),
        }
    }

    /// The store prefix used for order numbers.
    pub fn order_prefix(&self) -> &str {
        &self.order_prefix
    }

    // --- catalog -----------------------------------------------------------

    /// Adds a product to the catalog.
    pub fn insert_product(&mut self, product: Product) -> ProductKey {
        self.catalog.insert(product)
    }

    /// Looks up a product.
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.catalog.get(key)
    }

    /// The whole catalog.
    pub fn catalog(&self) -> &SlotMap<ProductKey, Product> {
        &self.catalog
    }

    /// Activates or deactivates a product. No-op for an unknown key.
    pub fn set_product_active(&mut self, key: ProductKey, is_active: bool) {
        if let Some(product) = self.catalog.get_mut(key) {
            product.is_active = is_active;
        }
    }

    /// Changes a product's current price. No-op for an unknown key.
    ///
    /// Carts referencing the product keep their cached display price; the
    /// new price takes effect the moment an order is created.
    pub fn set_product_price(&mut self, key: ProductKey, price: Clp) {
        if let Some(product) = self.catalog.get_mut(key) {
            product.price = price;
        }
    }

    /// Atomically claims stock for the given lines; see
    /// [`inventory::reserve`].
    ///
    /// # Errors
    ///
    /// Propagates [`inventory::ReserveError`] without touching any counter.
    pub fn reserve(
        &mut self,
        lines: &[LineReservation],
        now: DateTime<Utc>,
    ) -> Result<(), inventory::ReserveError> {
        inventory::reserve(&mut self.catalog, lines, &mut self.inventory_log, now)
    }

    /// The audit log of stock decrements, oldest first.
    pub fn inventory_log(&self) -> &[InventoryChange] {
        &self.inventory_log
    }

    // --- carts -------------------------------------------------------------

    /// The cart for an identity, if one exists. An absent cart is a normal
    /// result, not an error.
    pub fn cart(&self, identity: &Identity) -> Option<&Cart> {
        self.carts.get(identity)
    }

    /// Sets or replaces a cart line; quantity zero removes it.
    ///
    /// Creates the cart implicitly on first use and drops the document again
    /// once its last line is removed. The cached line price is the current
    /// catalog price (zero for an unknown product; checkout will reject that
    /// line anyway). Stock is not validated here.
    pub fn upsert_cart_item(
        &mut self,
        identity: &Identity,
        product: ProductKey,
        quantity: u32,
        now: DateTime<Utc>,
    ) {
        let price = self
            .catalog
            .get(product)
            .map_or(Clp::new(0), |product| product.price);
        let cart = self
            .carts
            .entry(identity.clone())
            .or_insert_with(|| Cart::new(now));
        cart.upsert(product, quantity, price, now);
        if cart.is_empty() {
            self.carts.remove(identity);
        }
    }

    /// Removes the line for a product, dropping the cart document if it was
    /// the last line.
    pub fn remove_cart_item(
        &mut self,
        identity: &Identity,
        product: ProductKey,
        now: DateTime<Utc>,
    ) {
        if let Some(cart) = self.carts.get_mut(identity) {
            cart.remove(product, now);
            if cart.is_empty() {
                self.carts.remove(identity);
            }
        }
    }

    /// Deletes the cart document entirely.
    pub fn clear_cart(&mut self, identity: &Identity) {
        self.carts.remove(identity);
    }

    // --- orders ------------------------------------------------------------

    /// Persists a finalized order.
    pub fn insert_order(&mut self, order: Order) -> OrderKey {
        self.orders.insert(order)
    }

    /// Looks up an order.
    pub fn order(&self, key: OrderKey) -> Option<&Order> {
        self.orders.get(key)
    }

    /// The order history of a user, most recent first.
    ///
    /// Guest orders carry no user and never appear here. `limit` defaults to
    /// [`DEFAULT_ORDER_HISTORY_LIMIT`].
    pub fn orders_by_user(&self, user: &UserId, limit: Option<usize>) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| order.user() == Some(user))
            .collect();
        orders.sort_by_key(|order| std::cmp::Reverse(order.created_at()));
        orders.truncate(limit.unwrap_or(DEFAULT_ORDER_HISTORY_LIMIT));
        orders
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, thread-safe handle to a store.
///
/// Cloning is cheap and clones share the same state. Reads take the read
/// lock; every mutation takes the write lock for its whole sequence.
#[derive(Debug, Clone, Default)]
pub struct Storefront {
    state: Arc<RwLock<StoreState>>,
}

impl Storefront {
    /// Creates an empty storefront with the default order-number prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty storefront with a custom store prefix.
    pub fn with_order_prefix(prefix: impl Into<String>) -> Self {
        Storefront {
            state: Arc::new(RwLock::new(StoreState::with_order_prefix(prefix))),
        }
    }

    /// Runs a closure against the exclusive session.
    ///
    /// Everything inside the closure is one atomic unit with respect to all
    /// other operations on this storefront. Demos and tests also use this to
    /// drive checkout with a fixed clock and rng.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        f(&mut self.state.write())
    }

    /// Adds a product to the catalog.
    pub fn insert_product(&self, product: Product) -> ProductKey {
        self.state.write().insert_product(product)
    }

    /// Looks up a product.
    pub fn product(&self, key: ProductKey) -> Option<Product> {
        self.state.read().product(key).cloned()
    }

    /// The cart for an identity, if one exists.
    pub fn cart(&self, identity: &Identity) -> Option<Cart> {
        self.state.read().cart(identity).cloned()
    }

    /// Adds units of a product to the cart, on top of any existing line.
    pub fn add_to_cart(&self, identity: &Identity, product: ProductKey, quantity: u32) {
        let mut state = self.state.write();
        let existing = state
            .cart(identity)
            .and_then(|cart| cart.item(product))
            .map_or(0, |item| item.quantity);
        let total = existing.saturating_add(quantity);
        debug!(?identity, ?product, quantity = total, "cart upsert");
        state.upsert_cart_item(identity, product, total, Utc::now());
    }

    /// Sets the quantity of a cart line outright; zero removes the line.
    pub fn update_cart_item(&self, identity: &Identity, product: ProductKey, quantity: u32) {
        debug!(?identity, ?product, quantity, "cart update");
        self.state
            .write()
            .upsert_cart_item(identity, product, quantity, Utc::now());
    }

    /// Removes a product's line from the cart.
    pub fn remove_from_cart(&self, identity: &Identity, product: ProductKey) {
        debug!(?identity, ?product, "cart remove");
        self.state
            .write()
            .remove_cart_item(identity, product, Utc::now());
    }

    /// Deletes the cart document entirely.
    pub fn clear_cart(&self, identity: &Identity) {
        debug!(?identity, "cart clear");
        self.state.write().clear_cart(identity);
    }

    /// Converts the identity's cart into an order; see
    /// [`coordinator::create_order`].
    ///
    /// The write lock is held across the whole resolve → price → reserve →
    /// persist → clear sequence, so either every effect lands or none does,
    /// and two checkouts contending on the same scarce product can never
    /// both succeed.
    ///
    /// # Errors
    ///
    /// One [`CheckoutError`] kind, with no partial writes behind it.
    pub fn create_order(
        &self,
        identity: &Identity,
        request: CheckoutRequest,
    ) -> Result<OrderReceipt, CheckoutError> {
        let mut state = self.state.write();
        coordinator::create_order(&mut state, identity, request, Utc::now(), &mut rand::rng())
    }

    /// Looks up an order.
    pub fn order(&self, key: OrderKey) -> Option<Order> {
        self.state.read().order(key).cloned()
    }

    /// The order history of a user, most recent first.
    pub fn orders_by_user(&self, user: &UserId, limit: Option<usize>) -> Vec<Order> {
        self.state
            .read()
            .orders_by_user(user, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// A copy of the stock-decrement audit log, oldest first.
    pub fn inventory_log(&self) -> Vec<InventoryChange> {
        self.state.read().inventory_log().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identity::SessionId, products::InventorySettings};

    fn guest() -> Identity {
        Identity::Guest(SessionId::new("s-1"))
    }

    fn product(price: i64) -> Product {
        Product {
            name: "Copihue seeds".to_owned(),
            sku: "COP-01".to_owned(),
            price: Clp::new(price),
            is_active: true,
            inventory: InventorySettings::untracked(),
        }
    }

    #[test]
    fn absent_cart_is_a_normal_result() {
        let store = Storefront::new();

        assert!(store.cart(&guest()).is_none());
    }

    #[test]
    fn add_to_cart_accumulates_quantity() {
        let store = Storefront::new();
        let key = store.insert_product(product(1500));

        store.add_to_cart(&guest(), key, 2);
        store.add_to_cart(&guest(), key, 3);

        let cart = store.cart(&guest()).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.items()[0].price, Clp::new(1500));
    }

    #[test]
    fn update_to_zero_drops_the_cart_document() {
        let store = Storefront::new();
        let key = store.insert_product(product(1500));

        store.add_to_cart(&guest(), key, 2);
        store.update_cart_item(&guest(), key, 0);

        assert!(store.cart(&guest()).is_none());
    }

    #[test]
    fn clear_cart_deletes_the_document() {
        let store = Storefront::new();
        let key = store.insert_product(product(1500));

        store.add_to_cart(&guest(), key, 2);
        store.clear_cart(&guest());

        assert!(store.cart(&guest()).is_none());
    }

    #[test]
    fn carts_are_per_identity() {
        let store = Storefront::new();
        let key = store.insert_product(product(1500));
        let user = Identity::User(crate::identity::UserId::new("u-1"));

        store.add_to_cart(&guest(), key, 1);

        assert!(store.cart(&user).is_none());
        assert!(store.cart(&guest()).is_some());
    }

    #[test]
    fn clones_share_state() {
        let store = Storefront::new();
        let clone = store.clone();
        let key = store.insert_product(product(1500));

        clone.add_to_cart(&guest(), key, 1);

        assert!(store.cart(&guest()).is_some());
    }
}
