//! Caja
//!
//! Caja is the cart-to-order transaction engine of a CLP storefront: it
//! resolves cart ownership, re-validates prices and stock against the
//! catalog, computes tax and shipping, reserves inventory and creates
//! immutable orders, all inside one atomic, serializable operation, because
//! this is the one place where a correctness failure costs money.
//!
//! Presentation, authentication, search and the rest of the storefront are
//! external collaborators; they talk to this crate through
//! [`store::Storefront`].

pub mod cart;
pub mod checkout;
pub mod fixtures;
pub mod identity;
pub mod inventory;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod products;
pub mod store;
pub mod utils;
