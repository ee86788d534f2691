//! CLP amounts
//!
//! The Chilean peso has no minor subunit, so every amount in this crate is a
//! whole number of pesos. Arithmetic is checked; display formatting goes
//! through [`rusty_money`].

use std::fmt;
use std::ops::Deref;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Orders at or above this subtotal ship for free.
pub const FREE_SHIPPING_THRESHOLD: Clp = Clp(15_000);

/// Flat shipping cost below the free-shipping threshold.
pub const SHIPPING_COST: Clp = Clp(2_990);

/// Errors from checked amount arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// An amount computation exceeded the representable range.
    #[error("amount arithmetic overflowed")]
    Overflow,
}

/// An amount of Chilean pesos.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Clp(i64);

impl Clp {
    /// Creates a new amount from a whole number of pesos.
    pub const fn new(value: i64) -> Self {
        Clp(value)
    }

    /// Adds another amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the sum is not representable.
    pub fn add(self, other: Clp) -> Result<Clp, AmountError> {
        self.0
            .checked_add(other.0)
            .map(Clp)
            .ok_or(AmountError::Overflow)
    }

    /// Subtracts another amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the difference is not
    /// representable.
    pub fn sub(self, other: Clp) -> Result<Clp, AmountError> {
        self.0
            .checked_sub(other.0)
            .map(Clp)
            .ok_or(AmountError::Overflow)
    }

    /// Multiplies the amount by a unit count.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the product is not representable.
    pub fn times(self, quantity: u32) -> Result<Clp, AmountError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Clp)
            .ok_or(AmountError::Overflow)
    }
}

impl Deref for Clp {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Clp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Money::from_minor(self.0, iso::CLP))
    }
}

/// The fixed Chilean VAT (IVA) rate.
pub fn tax_rate() -> Percentage {
    Percentage::from(Decimal::new(19, 2))
}

/// VAT owed on a subtotal, rounded half away from zero to whole pesos.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the rounded tax does not fit in an
/// amount.
pub fn tax_amount(subtotal: Clp) -> Result<Clp, AmountError> {
    let tax = tax_rate() * Decimal::from(subtotal.0);
    tax.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .map(Clp)
        .ok_or(AmountError::Overflow)
}

/// Shipping cost for a subtotal: free at or above the threshold, flat below.
pub fn shipping_cost(subtotal: Clp) -> Clp {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Clp::new(0)
    } else {
        SHIPPING_COST
    }
}
