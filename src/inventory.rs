//! Inventory reservation
//!
//! Claims tracked stock for an order. Reservation is all-or-nothing: every
//! line is verified against the catalog before any counter is touched, so a
//! failing line leaves the whole batch undecremented. Callers must run
//! [`reserve`] inside the store's exclusive session so the verify-then-
//! decrement sequence is serializable against concurrent reservations.

use chrono::{DateTime, Utc};
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::products::{Product, ProductKey};

/// A requested stock claim for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineReservation {
    /// The product to claim stock for.
    pub product: ProductKey,

    /// Units to claim.
    pub quantity: u32,
}

/// Small per-order list of stock claims.
pub type LineReservations = SmallVec<[LineReservation; 8]>;

/// An audit record of a stock decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryChange {
    /// The affected product.
    pub product: ProductKey,

    /// The product's SKU at the time of the change.
    pub sku: String,

    /// Units removed from stock.
    pub quantity: u32,

    /// Stock remaining after the change.
    pub remaining: u32,

    /// When the change happened.
    pub at: DateTime<Utc>,
}

/// Errors from stock reservation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReserveError {
    /// A line refers to a product the catalog does not know.
    #[error("cannot reserve stock for unknown product {0:?}")]
    UnknownProduct(ProductKey),

    /// A tracked product has less stock than requested.
    #[error("insufficient stock for {sku}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The short-stocked product.
        product: ProductKey,

        /// The product's SKU.
        sku: String,

        /// Units requested.
        requested: u32,

        /// Units actually available.
        available: u32,
    },
}

/// Atomically claims stock for every line, or claims nothing.
///
/// Lines naming the same product are folded together and checked against
/// their combined total, so a batch can never pass verification line by line
/// while jointly exceeding the stock on hand. Untracked products always
/// succeed and leave no audit entry; tracked products are decremented and
/// logged. On success one [`InventoryChange`] is appended to `log` per
/// decremented product.
///
/// # Errors
///
/// - [`ReserveError::UnknownProduct`] if a line's product is not in the
///   catalog.
/// - [`ReserveError::InsufficientStock`] if a product's combined claim
///   exceeds the stock on hand. No counter is changed in that case.
pub fn reserve(
    catalog: &mut SlotMap<ProductKey, Product>,
    lines: &[LineReservation],
    log: &mut Vec<InventoryChange>,
    now: DateTime<Utc>,
) -> Result<(), ReserveError> {
    // Fold the batch into one claim per product, in first-seen order.
    let mut claims: SmallVec<[LineReservation; 8]> = SmallVec::new();
    for line in lines {
        if let Some(claim) = claims.iter_mut().find(|claim| claim.product == line.product) {
            claim.quantity = claim.quantity.saturating_add(line.quantity);
        } else {
            claims.push(*line);
        }
    }

    // Verify every claim and compute its post-decrement stock with checked
    // arithmetic before touching any counter.
    let mut decrements: SmallVec<[(LineReservation, u32); 8]> = SmallVec::new();
    for claim in &claims {
        let product = catalog
            .get(claim.product)
            .ok_or(ReserveError::UnknownProduct(claim.product))?;
        if !product.inventory.track_inventory {
            continue;
        }
        let Some(remaining) = product.inventory.quantity.checked_sub(claim.quantity) else {
            return Err(ReserveError::InsufficientStock {
                product: claim.product,
                sku: product.sku.clone(),
                requested: claim.quantity,
                available: product.inventory.quantity,
            });
        };
        decrements.push((*claim, remaining));
    }

    for (claim, remaining) in decrements {
        let Some(product) = catalog.get_mut(claim.product) else {
            continue; // verified above
        };
        product.inventory.quantity = remaining;
        log.push(InventoryChange {
            product: claim.product,
            sku: product.sku.clone(),
            quantity: claim.quantity,
            remaining,
            at: now,
        });
        if product.is_low_on_stock() {
            debug!(
                sku = %product.sku,
                remaining,
                threshold = product.inventory.low_stock_threshold,
                "product low on stock after reservation"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use smallvec::smallvec;

    use super::*;
    use crate::{money::Clp, products::InventorySettings};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn catalog_with(
        settings: &[InventorySettings],
    ) -> (SlotMap<ProductKey, Product>, Vec<ProductKey>) {
        let mut catalog = SlotMap::with_key();
        let keys = settings
            .iter()
            .enumerate()
            .map(|(i, inventory)| {
                catalog.insert(Product {
                    name: format!("Product {i}"),
                    sku: format!("SKU-{i}"),
                    price: Clp::new(1000),
                    is_active: true,
                    inventory: *inventory,
                })
            })
            .collect();
        (catalog, keys)
    }

    #[test]
    fn reserves_and_logs_tracked_lines() -> Result<(), ReserveError> {
        let (mut catalog, keys) = catalog_with(&[
            InventorySettings::tracked(5, 1),
            InventorySettings::untracked(),
        ]);
        let lines: LineReservations = smallvec![
            LineReservation {
                product: keys[0],
                quantity: 2,
            },
            LineReservation {
                product: keys[1],
                quantity: 10,
            },
        ];
        let mut log = Vec::new();

        reserve(&mut catalog, &lines, &mut log, at(1))?;

        assert_eq!(catalog[keys[0]].inventory.quantity, 3);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sku, "SKU-0");
        assert_eq!(log[0].quantity, 2);
        assert_eq!(log[0].remaining, 3);
        Ok(())
    }

    #[test]
    fn failed_line_leaves_whole_batch_untouched() {
        let (mut catalog, keys) = catalog_with(&[
            InventorySettings::tracked(5, 1),
            InventorySettings::tracked(1, 0),
        ]);
        let lines = [
            LineReservation {
                product: keys[0],
                quantity: 2,
            },
            LineReservation {
                product: keys[1],
                quantity: 2,
            },
        ];
        let mut log = Vec::new();

        let err = reserve(&mut catalog, &lines, &mut log, at(1));

        assert_eq!(
            err,
            Err(ReserveError::InsufficientStock {
                product: keys[1],
                sku: "SKU-1".to_owned(),
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(catalog[keys[0]].inventory.quantity, 5);
        assert_eq!(catalog[keys[1]].inventory.quantity, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn duplicate_lines_exceeding_stock_jointly_are_rejected() {
        // Each line alone fits the stock of 4; together they do not.
        let (mut catalog, keys) = catalog_with(&[InventorySettings::tracked(4, 0)]);
        let lines = [
            LineReservation {
                product: keys[0],
                quantity: 3,
            },
            LineReservation {
                product: keys[0],
                quantity: 3,
            },
        ];
        let mut log = Vec::new();

        let err = reserve(&mut catalog, &lines, &mut log, at(1));

        assert_eq!(
            err,
            Err(ReserveError::InsufficientStock {
                product: keys[0],
                sku: "SKU-0".to_owned(),
                requested: 6,
                available: 4,
            })
        );
        assert_eq!(catalog[keys[0]].inventory.quantity, 4);
        assert!(log.is_empty());
    }

    #[test]
    fn duplicate_lines_within_stock_fold_into_one_claim() -> Result<(), ReserveError> {
        let (mut catalog, keys) = catalog_with(&[InventorySettings::tracked(6, 0)]);
        let lines = [
            LineReservation {
                product: keys[0],
                quantity: 3,
            },
            LineReservation {
                product: keys[0],
                quantity: 3,
            },
        ];
        let mut log = Vec::new();

        reserve(&mut catalog, &lines, &mut log, at(1))?;

        assert_eq!(catalog[keys[0]].inventory.quantity, 0);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].quantity, 6);
        assert_eq!(log[0].remaining, 0);
        Ok(())
    }

    #[test]
    fn unknown_product_is_rejected() {
        let (mut catalog, keys) = catalog_with(&[InventorySettings::tracked(5, 1)]);
        let stale = keys[0];
        catalog.remove(stale);
        let lines = [LineReservation {
            product: stale,
            quantity: 1,
        }];
        let mut log = Vec::new();

        assert_eq!(
            reserve(&mut catalog, &lines, &mut log, at(1)),
            Err(ReserveError::UnknownProduct(stale))
        );
    }

    #[test]
    fn exact_stock_can_be_reserved() -> Result<(), ReserveError> {
        let (mut catalog, keys) = catalog_with(&[InventorySettings::tracked(2, 0)]);
        let lines = [LineReservation {
            product: keys[0],
            quantity: 2,
        }];
        let mut log = Vec::new();

        reserve(&mut catalog, &lines, &mut log, at(1))?;

        assert_eq!(catalog[keys[0]].inventory.quantity, 0);
        Ok(())
    }
}
