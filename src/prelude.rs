//! Caja prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartItem, CartTotals},
    checkout::{
        CheckoutRequest, CustomerInfo, ShippingAddress, ValidationError,
        coordinator::{CheckoutError, OrderReceipt, create_order},
        pricing::{PricedCart, PricingError, price_cart},
    },
    fixtures::{Fixture, FixtureError, ProductKeyMap},
    identity::{Identity, IdentityError, SessionId, UserId},
    inventory::{InventoryChange, LineReservation, LineReservations, ReserveError},
    money::{
        AmountError, Clp, FREE_SHIPPING_THRESHOLD, SHIPPING_COST, shipping_cost, tax_amount,
        tax_rate,
    },
    orders::{
        Order, OrderDraft, OrderKey, OrderLine, OrderLines, OrderStatus, OrderTotals,
        PaymentStatus,
        number::{DEFAULT_PREFIX, order_number},
    },
    products::{InventorySettings, Product, ProductKey},
    store::{DEFAULT_ORDER_HISTORY_LIMIT, StoreError, StoreState, Storefront},
};
