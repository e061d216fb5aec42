//! Carton CLI - inspect and edit a session-stored cart.
//!
//! # Usage
//!
//! ```bash
//! # Add a product variant (price defaults to the catalog price)
//! carton --catalog catalog.json add 1 --quantity 2 --attr size=M
//!
//! # Show the cart kept in the default session file
//! carton show
//!
//! # Work on a second cart in the same session
//! carton --session-key wishlist add 3
//! ```
//!
//! # Commands
//!
//! - `add` - Add units of a product variant
//! - `remove` - Drop a product variant
//! - `remove-one` - Take one unit of a product variant off
//! - `clear` - Empty the cart
//! - `show` - Print the cart
//!
//! # Environment Variables
//!
//! - `CART_SESSION_KEY` / `CART_PRODUCT_LOOKUP` - see `carton::config`
//! - `RUST_LOG` - log filter (default: `info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use carton::{CartConfig, VariantAttributes};
use carton_core::{AttributeValue, ProductId};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod files;

use commands::cart::{CartSummary, Context};

#[derive(Parser)]
#[command(name = "carton")]
#[command(author, version, about = "Session cart tools")]
struct Cli {
    /// Session file holding the serialized cart
    #[arg(long, global = true, default_value = "carton-session.json")]
    session: PathBuf,

    /// Catalog file listing the available products
    #[arg(long, global = true, default_value = "catalog.json")]
    catalog: PathBuf,

    /// Session key to store the cart under (overrides `CART_SESSION_KEY`)
    #[arg(long, global = true)]
    session_key: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add units of a product variant
    Add {
        /// Product primary key
        product: ProductId,

        /// Unit price for a new line, e.g. `9.99` (defaults to the catalog price)
        #[arg(short, long)]
        price: Option<String>,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Drop a product variant from the cart
    Remove {
        /// Product primary key
        product: ProductId,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Take one unit of a product variant off the cart
    RemoveOne {
        /// Product primary key
        product: ProductId,

        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Remove every line
    Clear,
    /// Print the cart
    Show,
}

#[derive(Args)]
struct VariantArgs {
    /// Variant attribute as name=value (repeatable)
    #[arg(short, long = "attr", value_parser = commands::cart::parse_attribute)]
    attrs: Vec<(String, AttributeValue)>,
}

impl VariantArgs {
    fn into_attributes(self) -> VariantAttributes {
        self.attrs.into_iter().collect()
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level if RUST_LOG is not set
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CartConfig::from_env()?;
    if let Some(key) = cli.session_key {
        config = config.with_session_key(key);
    }
    let ctx = Context {
        session_path: cli.session,
        catalog_path: cli.catalog,
        config,
    };

    let summary = match cli.command {
        Commands::Add {
            product,
            price,
            quantity,
            variant,
        } => commands::cart::add(
            &ctx,
            product,
            price.as_deref(),
            quantity,
            &variant.into_attributes(),
        )?,
        Commands::Remove { product, variant } => {
            commands::cart::remove(&ctx, product, &variant.into_attributes())?
        }
        Commands::RemoveOne { product, variant } => {
            commands::cart::remove_one(&ctx, product, &variant.into_attributes())?
        }
        Commands::Clear => commands::cart::clear(&ctx)?,
        Commands::Show => commands::cart::show(&ctx)?,
    };

    report(&ctx, &summary);
    Ok(())
}

fn report(ctx: &Context, summary: &CartSummary) {
    info!(session_key = %ctx.config.session_key, "Cart");
    for line in &summary.lines {
        info!(
            product = %line.product_id,
            name = %line.name,
            attributes = %line.attributes,
            quantity = line.quantity,
            price = %line.price,
            subtotal = %line.subtotal,
            "Line"
        );
    }
    info!(
        count = summary.count,
        unique = summary.unique_count,
        total = %summary.total,
        "Totals"
    );
}
