//! Orders
//!
//! An order is the immutable, audit-grade record a checkout produces. Line
//! items snapshot the product's name, SKU and price at creation time, so the
//! record stays accurate no matter what later happens to the catalog.

use chrono::{DateTime, Utc};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{
    checkout::{CustomerInfo, ShippingAddress},
    identity::UserId,
    money::Clp,
    products::ProductKey,
};

pub mod number;

new_key_type! {
    /// Order Key
    pub struct OrderKey;
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderStatus {
    /// Order created, not yet handled.
    #[default]
    Pending,

    /// Order is being prepared.
    Processing,

    /// Order has been handed to the carrier.
    Shipped,

    /// Order has reached the customer.
    Delivered,

    /// Order was cancelled.
    Cancelled,
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Payment not yet settled.
    #[default]
    Pending,

    /// Payment settled successfully.
    Paid,

    /// Payment failed.
    Failed,
}

/// A snapshotted order line.
///
/// Carries a copy of the product's name and SKU rather than a reference, so
/// the order is decoupled from future catalog changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// The product the line was created from.
    pub product: ProductKey,

    /// Product name at creation time.
    pub name: String,

    /// Product SKU at creation time.
    pub sku: String,

    /// Units ordered.
    pub quantity: u32,

    /// Catalog unit price at creation time.
    pub unit_price: Clp,

    /// `unit_price × quantity`.
    pub total_price: Clp,
}

/// Small per-order list of lines.
pub type OrderLines = SmallVec<[OrderLine; 8]>;

/// The money fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of line totals.
    pub subtotal: Clp,

    /// VAT on the subtotal.
    pub tax_amount: Clp,

    /// Shipping cost.
    pub shipping_cost: Clp,

    /// Discount applied. Always zero here; no discount subsystem feeds it.
    pub discount_amount: Clp,

    /// `subtotal + tax_amount + shipping_cost − discount_amount`.
    pub total_amount: Clp,
}

/// The coordinator-supplied parts of a new order.
///
/// Groups what the checkout request and the order-number generator
/// contribute, as opposed to what pricing computes.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// The generated order number.
    pub number: String,

    /// The purchasing user, `None` for guests.
    pub user: Option<UserId>,

    /// Customer contact details.
    pub customer: CustomerInfo,

    /// Shipping address.
    pub shipping_address: ShippingAddress,

    /// Payment method label. Free-form at this layer.
    pub payment_method: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An immutable order record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    number: String,
    user: Option<UserId>,
    lines: OrderLines,
    totals: OrderTotals,
    customer: CustomerInfo,
    shipping_address: ShippingAddress,
    payment_method: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Assembles a new pending order.
    ///
    /// Only the transaction coordinator creates orders; nothing in the cart
    /// subsystem ever mutates one afterwards.
    pub fn create(draft: OrderDraft, lines: OrderLines, totals: OrderTotals) -> Self {
        Order {
            number: draft.number,
            user: draft.user,
            lines,
            totals,
            customer: draft.customer,
            shipping_address: draft.shipping_address,
            payment_method: draft.payment_method,
            status: OrderStatus::default(),
            payment_status: PaymentStatus::default(),
            created_at: draft.created_at,
        }
    }

    /// The human-readable order number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// The purchasing user, if the order was placed by an authenticated user.
    ///
    /// Guest orders carry no owner and never appear in order history.
    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    /// The snapshotted lines.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// The money fields.
    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    /// The customer contact details given at checkout.
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// The shipping address given at checkout.
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// The payment method label given at checkout.
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    /// Fulfilment status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Payment status.
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// When the order was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Creation time as epoch milliseconds, for the presentation layer.
    pub fn created_at_ms(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
