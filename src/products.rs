//! Products
//!
//! Catalog product records. The catalog is the authoritative source for the
//! current price, active flag and stock counters; carts only cache a display
//! price, and checkout re-reads everything from here.

use slotmap::new_key_type;

use crate::money::Clp;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Stock-tracking settings for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventorySettings {
    /// Whether stock is tracked for this product at all.
    pub track_inventory: bool,

    /// Units currently in stock. Meaningless when tracking is off.
    pub quantity: u32,

    /// Stock level at or below which the product counts as low on stock.
    pub low_stock_threshold: u32,
}

impl InventorySettings {
    /// Settings for a product whose stock is not tracked.
    pub const fn untracked() -> Self {
        InventorySettings {
            track_inventory: false,
            quantity: 0,
            low_stock_threshold: 0,
        }
    }

    /// Settings for a tracked product with the given stock on hand.
    pub const fn tracked(quantity: u32, low_stock_threshold: u32) -> Self {
        InventorySettings {
            track_inventory: true,
            quantity,
            low_stock_threshold,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Product name
    pub name: String,

    /// Stock-keeping unit identifier
    pub sku: String,

    /// Current unit price
    pub price: Clp,

    /// Whether the product can currently be purchased
    pub is_active: bool,

    /// Stock-tracking settings
    pub inventory: InventorySettings,
}

impl Product {
    /// Whether the product can satisfy a request for `quantity` units.
    ///
    /// Untracked products always can; tracked products need enough stock on
    /// hand.
    pub fn can_supply(&self, quantity: u32) -> bool {
        !self.inventory.track_inventory || self.inventory.quantity >= quantity
    }

    /// Whether the product is at or below its low-stock threshold.
    pub fn is_low_on_stock(&self) -> bool {
        self.inventory.track_inventory
            && self.inventory.quantity <= self.inventory.low_stock_threshold
    }
}
