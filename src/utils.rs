//! Utils

use clap::Parser;

/// Arguments for the storefront demos
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to use for the catalog & cart
    #[clap(short, long, default_value = "store")]
    pub fixture: String,

    /// User id to check out as; a guest session is used if omitted
    #[clap(short, long)]
    pub user: Option<String>,

    /// Payment method label to record on the order
    #[clap(short, long, default_value = "webpay")]
    pub payment: String,
}
