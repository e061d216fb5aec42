//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Add two medium tees at the catalog price
//! carton add 1 --quantity 2 --attr size=M
//!
//! # Add at an explicit price
//! carton add 2 --price 9.99
//!
//! # Take one unit off, or drop the line
//! carton remove-one 1 --attr size=M
//! carton remove 1 --attr size=M
//!
//! # Inspect or empty the cart
//! carton show
//! carton clear
//! ```
//!
//! Every command opens the session file, rebuilds the cart against the
//! catalog file, and writes the session back only if the cart changed.

use std::path::PathBuf;

use carton::{Cart, CartConfig, CatalogProduct, MemoryCatalog, VariantAttributes};
use carton_core::{AttributeValue, Price, ProductId};
use tracing::instrument;

use super::CliError;
use crate::files::{CatalogEntry, FileSession, load_catalog};

/// Paths and configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub session_path: PathBuf,
    pub catalog_path: PathBuf,
    pub config: CartConfig,
}

/// One cart line, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSummary {
    pub product_id: ProductId,
    pub name: String,
    pub attributes: String,
    pub quantity: u32,
    pub price: Price,
    pub subtotal: Price,
}

/// Cart state after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<LineSummary>,
    pub count: u64,
    pub unique_count: usize,
    pub total: Price,
}

type FileCart<'s> = Cart<'s, FileSession, CatalogEntry>;

/// Parse a `name=value` attribute argument.
///
/// # Errors
///
/// Returns a message if the argument has no `=`, an empty name, or uses `_pk`.
pub fn parse_attribute(raw: &str) -> Result<(String, AttributeValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("attribute name missing in '{raw}'"));
    }
    if name == carton::PK_ATTRIBUTE {
        return Err(format!("'{name}' is reserved"));
    }
    Ok((name.to_owned(), AttributeValue::infer(value.trim())))
}

/// Add a product to the cart, at `price` or else the catalog price.
///
/// # Errors
///
/// Returns `CliError` if the product is unknown or the cart rejects the add.
#[instrument(skip(ctx, attributes))]
pub fn add(
    ctx: &Context,
    id: ProductId,
    price: Option<&str>,
    quantity: u32,
    attributes: &VariantAttributes,
) -> Result<CartSummary, CliError> {
    with_cart(ctx, |cart, catalog| {
        let product = find_product(catalog, id)?;
        match price {
            Some(price) => cart.add_with_price_text(product, price, quantity, attributes)?,
            None => cart.add(product, product.price, quantity, attributes)?,
        }
        Ok(())
    })
}

/// Remove a product variant from the cart.
///
/// # Errors
///
/// Returns `CliError` if the product is unknown or the session cannot be written.
#[instrument(skip(ctx, attributes))]
pub fn remove(
    ctx: &Context,
    id: ProductId,
    attributes: &VariantAttributes,
) -> Result<CartSummary, CliError> {
    with_cart(ctx, |cart, catalog| {
        cart.remove(find_product(catalog, id)?, attributes)?;
        Ok(())
    })
}

/// Take one unit of a product variant off the cart.
///
/// # Errors
///
/// Returns `CliError` if the product is unknown or the session cannot be written.
#[instrument(skip(ctx, attributes))]
pub fn remove_one(
    ctx: &Context,
    id: ProductId,
    attributes: &VariantAttributes,
) -> Result<CartSummary, CliError> {
    with_cart(ctx, |cart, catalog| {
        cart.remove_single(find_product(catalog, id)?, attributes)?;
        Ok(())
    })
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CliError` if the session cannot be read or written.
#[instrument(skip(ctx))]
pub fn clear(ctx: &Context) -> Result<CartSummary, CliError> {
    with_cart(ctx, |cart, _| {
        cart.clear()?;
        Ok(())
    })
}

/// Current cart contents. Never writes the session.
///
/// # Errors
///
/// Returns `CliError` if the session or catalog cannot be read.
#[instrument(skip(ctx))]
pub fn show(ctx: &Context) -> Result<CartSummary, CliError> {
    with_cart(ctx, |_, _| Ok(()))
}

fn find_product(
    catalog: &MemoryCatalog<CatalogEntry>,
    id: ProductId,
) -> Result<&CatalogEntry, CliError> {
    catalog.get(id).ok_or(CliError::UnknownProduct(id))
}

fn with_cart(
    ctx: &Context,
    op: impl FnOnce(&mut FileCart<'_>, &MemoryCatalog<CatalogEntry>) -> Result<(), CliError>,
) -> Result<CartSummary, CliError> {
    let catalog = load_catalog(&ctx.catalog_path)?;
    let mut session = FileSession::open(&ctx.session_path)?;

    let mut cart = Cart::load(&mut session, &catalog, &ctx.config)?;
    op(&mut cart, &catalog)?;
    let summary = summarize(&cart);
    drop(cart);

    session.persist()?;
    Ok(summary)
}

fn summarize(cart: &FileCart<'_>) -> CartSummary {
    let lines = cart
        .items()
        .iter()
        .map(|line| LineSummary {
            product_id: line.product().primary_key(),
            name: line.product().name.clone(),
            attributes: line
                .attributes()
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(","),
            quantity: line.quantity(),
            price: line.price(),
            subtotal: line.subtotal(),
        })
        .collect();
    CartSummary {
        lines,
        count: cart.count(),
        unique_count: cart.unique_count(),
        total: cart.total(),
    }
}
