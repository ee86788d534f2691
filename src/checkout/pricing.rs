//! Order pricing
//!
//! The pure half of checkout: validates a cart snapshot against the current
//! catalog and recomputes every money field from authoritative prices. The
//! cart's cached display prices are discarded here; the only price that ever
//! reaches an order is the catalog's. No storage is touched, which keeps
//! this pass unit-testable on bare data.

use slotmap::SlotMap;
use smallvec::smallvec;
use thiserror::Error;

use crate::{
    cart::Cart,
    inventory::{LineReservation, LineReservations},
    money::{AmountError, Clp, shipping_cost, tax_amount},
    orders::{OrderLine, OrderLines, OrderTotals},
    products::{Product, ProductKey},
};

/// Errors from pricing a cart against the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A cart line references a product that is missing from the catalog or
    /// deactivated. The two cases are deliberately indistinguishable.
    #[error("product {product:?} is unavailable")]
    ProductUnavailable {
        /// The unavailable product.
        product: ProductKey,
    },

    /// A tracked product has less stock than the cart requests.
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

    /// Money arithmetic overflowed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// A fully priced cart, ready to be reserved and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    /// Snapshotted order lines, one per cart line.
    pub lines: OrderLines,

    /// The stock claims the reservation service must make.
    pub reservations: LineReservations,

    /// Recomputed money fields.
    pub totals: OrderTotals,
}

/// Prices a cart against the catalog.
///
/// For each line: the product must exist and be active, tracked stock must
/// cover the requested quantity, and the unit price is re-read from the
/// catalog. Then `subtotal = Σ line totals`, `tax = round(subtotal × 0.19)`,
/// shipping is free at or above the threshold, and
/// `total = subtotal + tax + shipping − discount` with discount fixed at
/// zero.
///
/// # Errors
///
/// - [`PricingError::ProductUnavailable`] for a missing or inactive product.
/// - [`PricingError::InsufficientStock`] for a tracked stock shortfall.
/// - [`PricingError::Amount`] if any amount overflows.
pub fn price_cart(
    cart: &Cart,
    catalog: &SlotMap<ProductKey, Product>,
) -> Result<PricedCart, PricingError> {
    let mut lines: OrderLines = smallvec![];
    let mut reservations: LineReservations = smallvec![];
    let mut subtotal = Clp::new(0);

    for item in cart.items() {
        let product = catalog
            .get(item.product)
            .filter(|product| product.is_active)
            .ok_or(PricingError::ProductUnavailable {
                product: item.product,
            })?;
        if !product.can_supply(item.quantity) {
            return Err(PricingError::InsufficientStock {
                product: item.product,
                sku: product.sku.clone(),
                requested: item.quantity,
                available: product.inventory.quantity,
            });
        }

        let unit_price = product.price;
        let total_price = unit_price.times(item.quantity)?;
        subtotal = subtotal.add(total_price)?;

        lines.push(OrderLine {
            product: item.product,
            name: product.name.clone(),
            sku: product.sku.clone(),
            quantity: item.quantity,
            unit_price,
            total_price,
        });
        reservations.push(LineReservation {
            product: item.product,
            quantity: item.quantity,
        });
    }

    let tax = tax_amount(subtotal)?;
    let shipping = shipping_cost(subtotal);
    let discount = Clp::new(0);
    let total = subtotal.add(tax)?.add(shipping)?.sub(discount)?;

    Ok(PricedCart {
        lines,
        reservations,
        totals: OrderTotals {
            subtotal,
            tax_amount: tax,
            shipping_cost: shipping,
            discount_amount: discount,
            total_amount: total,
        },
    })
}
