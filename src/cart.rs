//! Carts
//!
//! One mutable cart per [`Identity`](crate::identity::Identity). Cart lines
//! cache the catalog price at the time the line was added, purely for
//! display; checkout discards the cached value and re-reads the catalog.
//! A cart with zero lines is equivalent to no cart at all, and the store
//! drops the document rather than keep an empty shell around.

use chrono::{DateTime, Utc};

use crate::{
    money::{AmountError, Clp, shipping_cost, tax_amount},
    products::ProductKey,
};

/// A single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    /// The product this line refers to.
    pub product: ProductKey,

    /// Requested units, always at least 1.
    pub quantity: u32,

    /// Cached display price per unit. Never trusted at checkout.
    pub price: Clp,
}

/// Display totals derived from a cart's cached prices.
///
/// These are read-time conveniences for the presentation layer; the
/// authoritative money fields are recomputed from the catalog when an order
/// is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of cached line totals.
    pub subtotal: Clp,

    /// VAT on the subtotal.
    pub tax: Clp,

    /// Shipping cost for the subtotal.
    pub shipping: Clp,

    /// Subtotal plus tax plus shipping.
    pub total: Clp,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(now: DateTime<Utc>) -> Self {
        Cart {
            items: Vec::new(),
            updated_at: now,
        }
    }

    /// The cart lines, in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// When the cart was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for a product, if present.
    pub fn item(&self, product: ProductKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product == product)
    }

    /// Sets or replaces the line for a product.
    ///
    /// A quantity of zero removes the line instead. No two lines ever share
    /// a product key. Stock is deliberately not validated here; browsing
    /// stays fast and tolerant of stale stock, and checkout re-validates.
    pub fn upsert(&mut self, product: ProductKey, quantity: u32, price: Clp, now: DateTime<Utc>) {
        if quantity == 0 {
            self.remove(product, now);
            return;
        }

        let line = CartItem {
            product,
            quantity,
            price,
        };
        if let Some(existing) = self.items.iter_mut().find(|item| item.product == product) {
            *existing = line;
        } else {
            self.items.push(line);
        }
        self.updated_at = now;
    }

    /// Removes the line for a product. Returns whether a line was removed.
    pub fn remove(&mut self, product: ProductKey, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product != product);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    /// Display totals from the cached line prices.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the cached prices overflow amount
    /// arithmetic.
    pub fn totals(&self) -> Result<CartTotals, AmountError> {
        let subtotal = self
            .items
            .iter()
            .try_fold(Clp::new(0), |acc, item| {
                acc.add(item.price.times(item.quantity)?)
            })?;
        let tax = tax_amount(subtotal)?;
        let shipping = shipping_cost(subtotal);
        let total = subtotal.add(tax)?.add(shipping)?;

        Ok(CartTotals {
            subtotal,
            tax,
            shipping,
            total,
        })
    }
}
