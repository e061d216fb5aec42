//! The session-backed cart.
//!
//! A [`Cart`] is built once per request from the session, mutated in place,
//! and written back to the session after every successful mutation. The
//! session is the only state that outlives the request.
//!
//! # Loading
//!
//! The stored blob is decoded, every referenced product is fetched from the
//! catalog in one query (narrowed by the configured lookup filter), and lines
//! whose product did not come back are dropped without error. The blob itself
//! is not rewritten at load time; the next mutation persists the pruned cart.
//!
//! A blob that cannot be decoded fails the load with
//! [`CartError::CorruptCartState`] rather than silently emptying the cart.
//! So does a blob whose lines add up to more than the largest [`Price`]:
//! a cart's total always fits, which keeps [`Cart::total`] infallible.

use std::collections::{BTreeSet, HashMap};

use carton_core::{Price, ProductId};
use tracing::{debug, info, instrument, warn};

use crate::catalog::{Catalog, CatalogProduct};
use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::key::{LineKey, VariantAttributes};
use crate::line::CartLine;
use crate::session::SessionStore;
use crate::wire;

/// A shopper's cart, bound to one session for the duration of a request.
pub struct Cart<'s, S: ?Sized, P> {
    session: &'s mut S,
    session_key: String,
    lines: Vec<CartLine<P>>,
    total: Price,
}

impl<'s, S, P> Cart<'s, S, P>
where
    S: SessionStore + ?Sized,
    P: CatalogProduct + Clone,
{
    /// Rebuild the cart stored under `config.session_key`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptCartState` if the stored blob cannot be
    /// decoded, or propagates session and catalog failures.
    #[instrument(skip(session, catalog, config), fields(session_key = %config.session_key))]
    pub fn load<C>(session: &'s mut S, catalog: &C, config: &CartConfig) -> Result<Self>
    where
        C: Catalog<Product = P> + ?Sized,
    {
        let mut cart = Self {
            session,
            session_key: config.session_key.clone(),
            lines: Vec::new(),
            total: Price::ZERO,
        };

        let Some(blob) = cart.session.get(&cart.session_key)? else {
            debug!("No cart in session");
            return Ok(cart);
        };

        let stored = wire::decode(&blob).map_err(|e| corrupt(&cart.session_key, &e))?;
        if stored.is_empty() {
            return Ok(cart);
        }

        let ids: BTreeSet<ProductId> = stored.iter().map(|(key, _)| key.product_id()).collect();
        let products: HashMap<ProductId, P> = catalog
            .find_by_primary_keys(&ids, &config.product_lookup)?
            .into_iter()
            .map(|product| (product.primary_key(), product))
            .collect();

        let mut dropped = 0_usize;
        for (key, record) in stored {
            let Some(product) = products.get(&key.product_id()) else {
                dropped += 1;
                continue;
            };
            let line = CartLine::from_record(product.clone(), key, record)
                .map_err(|e| corrupt(&cart.session_key, &e))?;
            match cart.position(line.key()) {
                Some(index) => {
                    if let Some(slot) = cart.lines.get_mut(index) {
                        *slot = line;
                    }
                }
                None => cart.lines.push(line),
            }
        }

        if dropped > 0 {
            info!(dropped, "Dropped cart lines for unavailable products");
        }
        cart.total = Price::checked_sum(cart.lines.iter().map(CartLine::subtotal))
            .ok_or_else(|| corrupt(&cart.session_key, &CartError::AmountOverflow))?;
        debug!(lines = cart.lines.len(), "Loaded cart");
        Ok(cart)
    }

    /// Add `quantity` of a product variant.
    ///
    /// If the variant is already in the cart its quantity grows and `price`
    /// is ignored; otherwise a new line is created at `price`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is zero,
    /// `CartError::MissingPrice` if a new line has no price,
    /// `CartError::ReservedAttribute` if `attributes` uses `_pk`,
    /// `CartError::QuantityOverflow` if the line would exceed `u32::MAX` units,
    /// or `CartError::AmountOverflow` if its subtotal or the cart total would
    /// exceed the largest price. The cart and the session are left unchanged
    /// on error.
    #[instrument(skip(self, product, attributes), fields(product_id = %product.primary_key()))]
    pub fn add(
        &mut self,
        product: &P,
        price: Option<Price>,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<()> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let key = LineKey::new(product.primary_key(), attributes)?;

        let total = self.total;
        if let Some(line) = self.line_mut(&key) {
            let grown = line.grown_by(quantity)?;
            let total = total
                .checked_sub(line.subtotal())
                .and_then(|rest| rest.checked_add(grown.1))
                .ok_or(CartError::AmountOverflow)?;
            line.set_quantity(grown);
            debug!(quantity = line.quantity(), "Increased cart line");
            self.total = total;
        } else {
            let price = price.ok_or_else(|| CartError::MissingPrice(key.product_id()))?;
            let line = CartLine::with_key(product.clone(), key, quantity, price)?;
            self.total = total
                .checked_add(line.subtotal())
                .ok_or(CartError::AmountOverflow)?;
            self.lines.push(line);
            debug!(quantity, %price, "Added cart line");
        }
        self.save()
    }

    /// Like [`Cart::add`], with the price given in its decimal string form.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidPrice` if `price` does not parse, even when
    /// the variant is already in the cart, or the errors of [`Cart::add`].
    pub fn add_with_price_text(
        &mut self,
        product: &P,
        price: &str,
        quantity: u32,
        attributes: &VariantAttributes,
    ) -> Result<()> {
        let price = Price::parse(price)?;
        self.add(product, Some(price), quantity, attributes)
    }

    /// Remove a product variant entirely. Absent variants are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ReservedAttribute` if `attributes` uses `_pk`, or
    /// propagates session failures.
    #[instrument(skip(self, product, attributes), fields(product_id = %product.primary_key()))]
    pub fn remove(&mut self, product: &P, attributes: &VariantAttributes) -> Result<()> {
        let key = LineKey::new(product.primary_key(), attributes)?;
        let Some(index) = self.position(&key) else {
            return Ok(());
        };
        let line = self.lines.remove(index);
        self.total = self
            .total
            .checked_sub(line.subtotal())
            .ok_or(CartError::AmountOverflow)?;
        debug!("Removed cart line");
        self.save()
    }

    /// Take one unit of a product variant off the cart, dropping the line
    /// when its last unit goes. Absent variants are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ReservedAttribute` if `attributes` uses `_pk`, or
    /// propagates session failures.
    #[instrument(skip(self, product, attributes), fields(product_id = %product.primary_key()))]
    pub fn remove_single(&mut self, product: &P, attributes: &VariantAttributes) -> Result<()> {
        let key = LineKey::new(product.primary_key(), attributes)?;
        let Some(index) = self.position(&key) else {
            return Ok(());
        };
        let remains = self
            .lines
            .get_mut(index)
            .is_some_and(CartLine::decrease_one);
        if !remains {
            self.lines.remove(index);
            debug!("Removed last unit of cart line");
        }
        self.total = Price::checked_sum(self.lines.iter().map(CartLine::subtotal))
            .ok_or(CartError::AmountOverflow)?;
        self.save()
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Propagates session failures.
    #[instrument(skip(self), fields(session_key = %self.session_key))]
    pub fn clear(&mut self) -> Result<()> {
        self.lines.clear();
        self.total = Price::ZERO;
        debug!("Cleared cart");
        self.save()
    }

    /// Write the cart into the session and mark the session modified.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Serialize` if encoding fails, or propagates
    /// session failures.
    pub fn save(&mut self) -> Result<()> {
        let blob = self.serialize()?;
        self.session.insert(&self.session_key, blob)?;
        self.session.mark_modified();
        debug!(session_key = %self.session_key, lines = self.lines.len(), "Saved cart");
        Ok(())
    }

    /// Whether any line holds this product, regardless of variant.
    #[must_use]
    pub fn contains(&self, product: &P) -> bool {
        let id = product.primary_key();
        self.lines
            .iter()
            .any(|line| line.product().primary_key() == id)
    }

    /// The line for a product variant, if present.
    ///
    /// Returns `None` for unknown variants and for attributes using `_pk`.
    #[must_use]
    pub fn get(&self, product: &P, attributes: &VariantAttributes) -> Option<&CartLine<P>> {
        let key = LineKey::new(product.primary_key(), attributes).ok()?;
        self.lines.iter().find(|line| *line.key() == key)
    }

    fn line_mut(&mut self, key: &LineKey) -> Option<&mut CartLine<P>> {
        self.lines.iter_mut().find(|line| line.key() == key)
    }
}

impl<S: ?Sized, P> Cart<'_, S, P> {
    /// Encode the cart in the session format.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Serialize` if encoding fails.
    pub fn serialize(&self) -> Result<String> {
        Ok(wire::encode(&self.lines)?)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine<P>] {
        &self.lines
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unique_count() == 0
    }

    /// The product held by each line, in line order.
    pub fn products(&self) -> impl Iterator<Item = &P> {
        self.lines.iter().map(CartLine::product)
    }

    /// Sum of line subtotals; zero for an empty cart.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    #[must_use]
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|line| line.key() == key)
    }
}

fn corrupt(session_key: &str, reason: &dyn std::fmt::Display) -> CartError {
    warn!(error = %reason, "Stored cart could not be decoded");
    CartError::CorruptCartState {
        key: session_key.to_owned(),
        reason: reason.to_string(),
    }
}
