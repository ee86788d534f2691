//! Transaction coordination
//!
//! Orchestrates the cart-to-order conversion as a two-phase commit: first a
//! pure, side-effect-free pass (validation and pricing), then the minimal
//! ordered set of writes (reserve stock → persist order → delete cart)
//! against one exclusive [`StoreState`] session. Every failure aborts before
//! the first write, and every step after the reservation is infallible, so
//! no intermediate state is ever externally visible.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    checkout::{
        CheckoutRequest, ValidationError,
        pricing::{self, PricingError},
    },
    identity::Identity,
    inventory::ReserveError,
    money::AmountError,
    orders::{Order, OrderDraft, OrderKey, number},
    products::ProductKey,
    store::{StoreError, StoreState},
};

/// The closed set of checkout outcomes besides success.
///
/// Exactly one of these is raised, and none of them leaves a partial write
/// behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The identity has no cart, or its cart has no lines. The caller shows
    /// an empty-cart state; retrying without user action cannot succeed.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line references a missing or deactivated product. The caller
    /// should prompt removal of that line.
    #[error("product {product:?} is unavailable")]
    ProductUnavailable {
        /// The unavailable product.
        product: ProductKey,
    },

    /// A tracked product has less stock than the cart requests. The caller
    /// should prompt a quantity reduction.
    #[error("insufficient stock for {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The short-stocked product.
        product: ProductKey,

        /// The product's SKU.
        sku: String,

        /// Units requested by the cart.
        requested: u32,

        /// Units actually available.
        available: u32,
    },

    /// Malformed customer or shipping input. The caller re-prompts the form.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Money arithmetic overflowed while pricing the cart.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The persistence layer failed. Transient; retrying the whole call is
    /// safe because no partial state was left behind.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<PricingError> for CheckoutError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::ProductUnavailable { product } => {
                CheckoutError::ProductUnavailable { product }
            }
            PricingError::InsufficientStock {
                product,
                sku,
                requested,
                available,
            } => CheckoutError::InsufficientStock {
                product,
                sku,
                requested,
                available,
            },
            PricingError::Amount(amount) => CheckoutError::Amount(amount),
        }
    }
}

impl From<ReserveError> for CheckoutError {
    fn from(err: ReserveError) -> Self {
        match err {
            // A product that vanished between pricing and reservation is a
            // plain unavailable product to the caller.
            ReserveError::UnknownProduct(product) => CheckoutError::ProductUnavailable { product },
            ReserveError::InsufficientStock {
                product,
                sku,
                requested,
                available,
            } => CheckoutError::InsufficientStock {
                product,
                sku,
                requested,
                available,
            },
        }
    }
}

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Key of the persisted order.
    pub order: OrderKey,

    /// The human-readable order number.
    pub order_number: String,
}

/// Converts the identity's cart into a persisted order.
///
/// Steps, all under the caller's exclusive session: validate the request,
/// resolve the cart, price it against the catalog (discarding cached cart
/// prices), reserve stock all-or-nothing, generate the order number, persist
/// the pending order, delete the cart.
///
/// # Errors
///
/// One [`CheckoutError`] kind. The cart, the catalog and the order store are
/// untouched on every error path.
pub fn create_order(
    state: &mut StoreState,
    identity: &Identity,
    request: CheckoutRequest,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<OrderReceipt, CheckoutError> {
    let result = checkout(state, identity, request, now, rng);
    match &result {
        Ok(receipt) => info!(order_number = %receipt.order_number, "order created"),
        Err(err) => warn!(%err, "checkout rejected"),
    }
    result
}

fn checkout(
    state: &mut StoreState,
    identity: &Identity,
    request: CheckoutRequest,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Result<OrderReceipt, CheckoutError> {
    request.validate()?;

    let cart = state
        .cart(identity)
        .filter(|cart| !cart.is_empty())
        .cloned()
        .ok_or(CheckoutError::EmptyCart)?;

    // Phase one: pure computation, no writes on any failure path.
    let priced = pricing::price_cart(&cart, state.catalog())?;

    // Phase two: reserve → persist → clear. The reservation is the last
    // fallible step.
    state.reserve(&priced.reservations, now)?;

    let order_number = number::order_number(state.order_prefix(), now.date_naive(), rng);
    let order = Order::create(
        OrderDraft {
            number: order_number.clone(),
            user: identity.user_id().cloned(),
            customer: request.customer,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            created_at: now,
        },
        priced.lines,
        priced.totals,
    );
    let order_key = state.insert_order(order);
    state.clear_cart(identity);

    Ok(OrderReceipt {
        order: order_key,
        order_number,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};
    use testresult::TestResult;

    use super::*;
    use crate::{
        checkout::{CustomerInfo, ShippingAddress},
        identity::{SessionId, UserId},
        money::Clp,
        products::{InventorySettings, Product},
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).single().unwrap()
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            customer: CustomerInfo {
                name: "Valentina Rojas".to_owned(),
                email: "valentina@example.cl".to_owned(),
                phone: None,
            },
            shipping_address: ShippingAddress {
                street: "Av. Providencia 1234".to_owned(),
                city: "Santiago".to_owned(),
                region: "RM".to_owned(),
                postal_code: "7500000".to_owned(),
                country: "CL".to_owned(),
                additional_info: None,
            },
            payment_method: "webpay".to_owned(),
        }
    }

    fn add_product(state: &mut StoreState, price: i64, inventory: InventorySettings) -> ProductKey {
        state.insert_product(Product {
            name: "Merkén 100g".to_owned(),
            sku: "MER-100".to_owned(),
            price: Clp::new(price),
            is_active: true,
            inventory,
        })
    }

    #[test]
    fn empty_cart_is_rejected_without_writes() {
        let mut state = StoreState::new();
        let identity = Identity::Guest(SessionId::new("s-1"));
        let mut rng = StdRng::seed_from_u64(0);

        let result = create_order(&mut state, &identity, request(), now(), &mut rng);

        assert_eq!(result, Err(CheckoutError::EmptyCart));
        assert!(state.inventory_log().is_empty());
    }

    #[test]
    fn invalid_input_is_rejected_before_any_read() {
        let mut state = StoreState::new();
        let identity = Identity::Guest(SessionId::new("s-1"));
        let key = add_product(&mut state, 1000, InventorySettings::tracked(5, 0));
        state.upsert_cart_item(&identity, key, 1, now());
        let mut bad = request();
        bad.customer.email = "nope".to_owned();
        let mut rng = StdRng::seed_from_u64(0);

        let result = create_order(&mut state, &identity, bad, now(), &mut rng);

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::InvalidEmail(_)))
        ));
        assert!(state.cart(&identity).is_some());
        assert_eq!(state.product(key).unwrap().inventory.quantity, 5);
    }

    #[test]
    fn successful_checkout_commits_every_effect() -> TestResult {
        let mut state = StoreState::new();
        let identity = Identity::User(UserId::new("u-1"));
        let key = add_product(&mut state, 1000, InventorySettings::tracked(5, 0));
        state.upsert_cart_item(&identity, key, 2, now());
        let mut rng = StdRng::seed_from_u64(0);

        let receipt = create_order(&mut state, &identity, request(), now(), &mut rng)?;

        // Order persisted with recomputed money fields.
        let order = state.order(receipt.order).unwrap();
        assert_eq!(order.number(), receipt.order_number);
        assert_eq!(order.totals().subtotal, Clp::new(2000));
        assert_eq!(order.user(), Some(&UserId::new("u-1")));
        // Stock decremented and logged.
        assert_eq!(state.product(key).unwrap().inventory.quantity, 3);
        assert_eq!(state.inventory_log().len(), 1);
        // Cart gone.
        assert!(state.cart(&identity).is_none());
        Ok(())
    }

    #[test]
    fn stock_shortfall_aborts_with_nothing_touched() {
        let mut state = StoreState::new();
        let identity = Identity::Guest(SessionId::new("s-1"));
        let plenty = add_product(&mut state, 1000, InventorySettings::tracked(10, 0));
        let scarce = add_product(&mut state, 2000, InventorySettings::tracked(1, 0));
        state.upsert_cart_item(&identity, plenty, 2, now());
        state.upsert_cart_item(&identity, scarce, 2, now());
        let mut rng = StdRng::seed_from_u64(0);

        let result = create_order(&mut state, &identity, request(), now(), &mut rng);

        assert_eq!(
            result,
            Err(CheckoutError::InsufficientStock {
                product: scarce,
                sku: "MER-100".to_owned(),
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(state.product(plenty).unwrap().inventory.quantity, 10);
        assert_eq!(state.product(scarce).unwrap().inventory.quantity, 1);
        assert!(state.cart(&identity).is_some());
        assert!(state.inventory_log().is_empty());
    }

    #[test]
    fn inactive_product_aborts_checkout() {
        let mut state = StoreState::new();
        let identity = Identity::Guest(SessionId::new("s-1"));
        let key = add_product(&mut state, 1000, InventorySettings::untracked());
        state.upsert_cart_item(&identity, key, 1, now());
        state.set_product_active(key, false);
        let mut rng = StdRng::seed_from_u64(0);

        let result = create_order(&mut state, &identity, request(), now(), &mut rng);

        assert_eq!(
            result,
            Err(CheckoutError::ProductUnavailable { product: key })
        );
        assert!(state.cart(&identity).is_some());
    }

    #[test]
    fn guest_orders_carry_no_user() -> TestResult {
        let mut state = StoreState::new();
        let identity = Identity::Guest(SessionId::new("s-1"));
        let key = add_product(&mut state, 1000, InventorySettings::untracked());
        state.upsert_cart_item(&identity, key, 1, now());
        let mut rng = StdRng::seed_from_u64(0);

        let receipt = create_order(&mut state, &identity, request(), now(), &mut rng)?;

        assert_eq!(state.order(receipt.order).unwrap().user(), None);
        Ok(())
    }

    #[test]
    fn order_number_uses_store_prefix_and_date() -> TestResult {
        let mut state = StoreState::with_order_prefix("TT");
        let identity = Identity::Guest(SessionId::new("s-1"));
        let key = add_product(&mut state, 1000, InventorySettings::untracked());
        state.upsert_cart_item(&identity, key, 1, now());
        let mut rng = StdRng::seed_from_u64(0);

        let receipt = create_order(&mut state, &identity, request(), now(), &mut rng)?;

        assert!(receipt.order_number.starts_with("TT-260830-"));
        Ok(())
    }
}
