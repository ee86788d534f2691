//! End-to-end checkout demo.
//!
//! Seeds a storefront from a YAML fixture set, fills a cart, runs the
//! cart-to-order transaction and prints the resulting order.
//!
//! ```sh
//! cargo run --example checkout -- --fixture store --user valentina
//! ```

use anyhow::Context;
use clap::Parser;
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

use caja::prelude::*;
use caja::utils::DemoArgs;

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "SKU")]
    sku: String,

    #[tabled(rename = "Product")]
    name: String,

    #[tabled(rename = "Qty")]
    quantity: u32,

    #[tabled(rename = "Unit")]
    unit_price: Clp,

    #[tabled(rename = "Total")]
    total_price: Clp,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = DemoArgs::parse();

    let identity = match &args.user {
        Some(user) => Identity::resolve(Some(user.as_str()), None)?,
        None => Identity::resolve(None, Some("demo-session"))?,
    };

    let fixture = Fixture::from_set(&args.fixture)
        .with_context(|| format!("loading fixture set {:?}", args.fixture))?;

    let store = Storefront::new();
    store.transaction(|state| {
        let keys = fixture.seed_catalog(state);
        fixture.seed_cart(state, &identity, &keys)
    })?;

    let cart = store
        .cart(&identity)
        .context("fixture set has no cart lines")?;
    let totals = cart.totals()?;
    println!(
        "Cart: {} lines, display subtotal {}",
        cart.items().len(),
        totals.subtotal
    );

    let request = CheckoutRequest {
        customer: CustomerInfo {
            name: "Valentina Rojas".to_owned(),
            email: "valentina@example.cl".to_owned(),
            phone: Some("+56 9 1234 5678".to_owned()),
        },
        shipping_address: ShippingAddress {
            street: "Av. Providencia 1234".to_owned(),
            city: "Santiago".to_owned(),
            region: "RM".to_owned(),
            postal_code: "7500000".to_owned(),
            country: "CL".to_owned(),
            additional_info: None,
        },
        payment_method: args.payment.clone(),
    };

    let receipt = store.create_order(&identity, request)?;
    let order = store
        .order(receipt.order)
        .context("order vanished after checkout")?;

    println!("\nOrder {}", order.number());
    let rows: Vec<LineRow> = order
        .lines()
        .iter()
        .map(|line| LineRow {
            sku: line.sku.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total_price,
        })
        .collect();
    println!("{}", Table::new(rows));

    let totals = order.totals();
    println!("Subtotal  {}", totals.subtotal);
    println!("IVA 19%   {}", totals.tax_amount);
    println!("Shipping  {}", totals.shipping_cost);
    println!("Total     {}", totals.total_amount);

    if store.cart(&identity).is_none() {
        println!("\nCart is now empty.");
    }
    for change in store.inventory_log() {
        println!(
            "stock: {} -{} (remaining {})",
            change.sku, change.quantity, change.remaining
        );
    }

    Ok(())
}
