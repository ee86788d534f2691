//! Fixtures
//!
//! YAML-backed catalog and cart sets for demos and integration tests. A set
//! is a directory under the base path holding `products.yml` and optionally
//! `cart.yml`; string product keys from the files are mapped to real
//! [`ProductKey`]s when the set is seeded into a store.

use std::{fs, path::PathBuf};

use chrono::Utc;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    identity::Identity,
    money::Clp,
    products::{InventorySettings, Product, ProductKey},
    store::StoreState,
};

/// Fixture-key → catalog-key mapping produced when a set is seeded.
pub type ProductKeyMap = FxHashMap<String, ProductKey>;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A cart line references a product key the set does not define
    #[error("Product not found in fixture set: {0}")]
    ProductNotFound(String),
}

/// Stock-tracking settings as written in YAML.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryFixture {
    /// Whether stock is tracked
    #[serde(default)]
    pub track: bool,

    /// Units in stock
    #[serde(default)]
    pub quantity: u32,

    /// Low-stock threshold
    #[serde(default)]
    pub low_stock_threshold: u32,
}

fn default_active() -> bool {
    true
}

/// A product as written in YAML.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product SKU
    pub sku: String,

    /// Unit price in pesos
    pub price: i64,

    /// Whether the product is purchasable
    #[serde(default = "default_active")]
    pub active: bool,

    /// Stock settings
    #[serde(default)]
    pub inventory: InventoryFixture,
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct ProductsFixture {
    /// Map of fixture key -> product
    products: FxHashMap<String, ProductFixture>,
}

/// A cart line as written in YAML.
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Fixture key of the product
    pub product: String,

    /// Units in the cart
    pub quantity: u32,
}

/// Wrapper for a cart in YAML
#[derive(Debug, Default, Deserialize)]
struct CartFixture {
    /// Cart lines
    items: Vec<CartLineFixture>,
}

/// A loaded fixture set.
#[derive(Debug)]
pub struct Fixture {
    products: FxHashMap<String, ProductFixture>,
    cart: Vec<CartLineFixture>,
}

impl Fixture {
    /// Loads the named set from the default `./fixtures` base path.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Loads the named set from a custom base path.
    ///
    /// `products.yml` is required; `cart.yml` is optional and defaults to an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a file cannot be read or parsed.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let dir = base_path.into().join(name);

        let products_raw = fs::read_to_string(dir.join("products.yml"))?;
        let products: ProductsFixture = serde_norway::from_str(&products_raw)?;

        let cart_path = dir.join("cart.yml");
        let cart = if cart_path.exists() {
            let cart_raw = fs::read_to_string(cart_path)?;
            let cart: CartFixture = serde_norway::from_str(&cart_raw)?;
            cart.items
        } else {
            Vec::new()
        };

        debug!(
            set = name,
            products = products.products.len(),
            cart_lines = cart.len(),
            "fixture set loaded"
        );

        Ok(Fixture {
            products: products.products,
            cart,
        })
    }

    /// The fixture's cart lines, as written in the file.
    pub fn cart_lines(&self) -> &[CartLineFixture] {
        &self.cart
    }

    /// Inserts every product into the store's catalog.
    ///
    /// Returns the fixture-key → [`ProductKey`] mapping for later lookups.
    pub fn seed_catalog(&self, state: &mut StoreState) -> ProductKeyMap {
        self.products
            .iter()
            .map(|(fixture_key, fixture)| {
                let key = state.insert_product(Product {
                    name: fixture.name.clone(),
                    sku: fixture.sku.clone(),
                    price: Clp::new(fixture.price),
                    is_active: fixture.active,
                    inventory: if fixture.inventory.track {
                        InventorySettings::tracked(
                            fixture.inventory.quantity,
                            fixture.inventory.low_stock_threshold,
                        )
                    } else {
                        InventorySettings::untracked()
                    },
                });
                (fixture_key.clone(), key)
            })
            .collect()
    }

    /// Fills the identity's cart with the set's cart lines.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] if a cart line references a
    /// fixture key missing from `keys`.
    pub fn seed_cart(
        &self,
        state: &mut StoreState,
        identity: &Identity,
        keys: &ProductKeyMap,
    ) -> Result<(), FixtureError> {
        let now = Utc::now();
        for line in &self.cart {
            let key = keys
                .get(&line.product)
                .copied()
                .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?;
            state.upsert_cart_item(identity, key, line.quantity, now);
        }
        Ok(())
    }
}
