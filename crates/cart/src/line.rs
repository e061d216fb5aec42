//! A single cart line.

use core::fmt;

use carton_core::Price;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProduct;
use crate::error::{CartError, Result};
use crate::key::{LineKey, VariantAttributes};

/// Quantity and unit price of a line, as stored in the session.
///
/// Product identity and variant attributes travel in the line key, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub quantity: u32,
    pub price: Price,
}

/// One product variant in the cart.
///
/// The key and unit price are fixed at creation; only the quantity changes.
/// A line in a cart always has a quantity of at least one, and its subtotal
/// always fits in a [`Price`].
#[derive(Debug, Clone)]
pub struct CartLine<P> {
    product: P,
    key: LineKey,
    quantity: u32,
    price: Price,
    subtotal: Price,
}

impl<P: CatalogProduct> CartLine<P> {
    /// Create a line for a product without variant attributes.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is zero, or
    /// `CartError::AmountOverflow` if the subtotal does not fit in a price.
    pub fn new(product: P, quantity: u32, price: Price) -> Result<Self> {
        let key = LineKey::for_product(product.primary_key());
        Self::with_key(product, key, quantity, price)
    }

    /// Create a line from a price in its decimal string form.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidPrice` if `price` does not parse, or the
    /// errors of [`CartLine::new`].
    pub fn with_price_text(product: P, quantity: u32, price: &str) -> Result<Self> {
        let price = Price::parse(price)?;
        Self::new(product, quantity, price)
    }

    /// Create a line from its full key and stored record.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if the record's quantity is zero,
    /// or `CartError::AmountOverflow` if its subtotal does not fit in a price.
    pub fn from_record(product: P, key: LineKey, record: LineRecord) -> Result<Self> {
        Self::with_key(product, key, record.quantity, record.price)
    }

    pub(crate) fn with_key(product: P, key: LineKey, quantity: u32, price: Price) -> Result<Self> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        debug_assert_eq!(key.product_id(), product.primary_key());
        let subtotal = price
            .checked_times(quantity)
            .ok_or(CartError::AmountOverflow)?;
        Ok(Self {
            product,
            key,
            quantity,
            price,
            subtotal,
        })
    }
}

impl<P> CartLine<P> {
    /// The catalog product this line refers to.
    #[must_use]
    pub const fn product(&self) -> &P {
        &self.product
    }

    #[must_use]
    pub const fn key(&self) -> &LineKey {
        &self.key
    }

    /// Variant attributes distinguishing this line, without `_pk`.
    #[must_use]
    pub fn attributes(&self) -> VariantAttributes {
        self.key.attributes()
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price captured when the line was created.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Unit price times quantity.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    #[must_use]
    pub const fn to_record(&self) -> LineRecord {
        LineRecord {
            quantity: self.quantity,
            price: self.price,
        }
    }

    /// Quantity and subtotal after adding `by` units, without changing the line.
    pub(crate) fn grown_by(&self, by: u32) -> Result<(u32, Price)> {
        let quantity = self
            .quantity
            .checked_add(by)
            .ok_or_else(|| CartError::QuantityOverflow(self.key.product_id()))?;
        let subtotal = self
            .price
            .checked_times(quantity)
            .ok_or(CartError::AmountOverflow)?;
        Ok((quantity, subtotal))
    }

    /// Apply a quantity and subtotal checked by [`CartLine::grown_by`].
    pub(crate) const fn set_quantity(&mut self, (quantity, subtotal): (u32, Price)) {
        self.quantity = quantity;
        self.subtotal = subtotal;
    }

    /// Take one unit off the line. Returns `false` when nothing would remain,
    /// leaving the line untouched so the caller can drop it.
    pub(crate) fn decrease_one(&mut self) -> bool {
        let Some(quantity) = self.quantity.checked_sub(1).filter(|q| *q >= 1) else {
            return false;
        };
        match self.price.checked_times(quantity) {
            Some(subtotal) => {
                self.set_quantity((quantity, subtotal));
                true
            }
            None => false,
        }
    }
}

impl<P> fmt::Display for CartLine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CartLine({})", self.key.product_id())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use carton_core::ProductId;

    use super::*;
    use crate::catalog::SimpleProduct;

    fn product() -> SimpleProduct {
        SimpleProduct::new(ProductId::new(4))
    }

    #[test]
    fn test_new_line() {
        let line = CartLine::new(product(), 3, Price::parse("2.50").unwrap()).unwrap();
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.price(), Price::parse("2.50").unwrap());
        assert_eq!(line.subtotal(), Price::parse("7.50").unwrap());
        assert!(line.attributes().is_empty());
        assert_eq!(line.key().product_id(), ProductId::new(4));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = CartLine::new(product(), 0, Price::parse("1").unwrap());
        assert!(matches!(result, Err(CartError::InvalidQuantity(0))));
    }

    #[test]
    fn test_to_record() {
        let line = CartLine::new(product(), 2, Price::parse("10.00").unwrap()).unwrap();
        assert_eq!(
            line.to_record(),
            LineRecord {
                quantity: 2,
                price: Price::parse("10.00").unwrap(),
            }
        );
    }

    #[test]
    fn test_record_serializes_price_as_string() {
        let record = LineRecord {
            quantity: 2,
            price: Price::parse("10.00").unwrap(),
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"quantity":2,"price":"10.00"}"#
        );
    }

    #[test]
    fn test_decrease_one_stops_at_one() {
        let mut line = CartLine::new(product(), 2, Price::parse("1").unwrap()).unwrap();
        assert!(line.decrease_one());
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.subtotal(), Price::parse("1").unwrap());
        assert!(!line.decrease_one());
        assert_eq!(line.quantity(), 1);
    }

    #[test]
    fn test_price_text() {
        let line = CartLine::with_price_text(product(), 2, "4.25").unwrap();
        assert_eq!(line.subtotal(), Price::parse("8.50").unwrap());

        let result = CartLine::with_price_text(product(), 1, "four");
        assert!(matches!(result, Err(CartError::InvalidPrice(_))));
        let result = CartLine::with_price_text(product(), 1, "");
        assert!(matches!(result, Err(CartError::InvalidPrice(_))));
    }

    #[test]
    fn test_subtotal_overflow_rejected() {
        let result = CartLine::new(product(), 2, Price::MAX);
        assert!(matches!(result, Err(CartError::AmountOverflow)));
        assert!(CartLine::new(product(), 1, Price::MAX).is_ok());
    }

    #[test]
    fn test_grown_by_checks_limits() {
        let line = CartLine::new(product(), u32::MAX, Price::parse("1").unwrap()).unwrap();
        assert!(matches!(
            line.grown_by(5),
            Err(CartError::QuantityOverflow(id)) if id == ProductId::new(4)
        ));

        let mut line = CartLine::new(product(), 2, Price::parse("1.50").unwrap()).unwrap();
        let grown = line.grown_by(3).unwrap();
        assert_eq!(line.quantity(), 2);
        line.set_quantity(grown);
        assert_eq!(line.quantity(), 5);
        assert_eq!(line.subtotal(), Price::parse("7.50").unwrap());
    }

    #[test]
    fn test_display() {
        let line = CartLine::new(product(), 1, Price::parse("1").unwrap()).unwrap();
        assert_eq!(line.to_string(), "CartLine(4)");
    }
}
