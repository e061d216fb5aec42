//! Canonical line keys.
//!
//! A cart line is identified by its product's primary key together with any
//! variant attributes the caller supplied. The key is stored as a sorted
//! sequence of `(name, value)` pairs, so two keys built from the same pairs
//! compare and hash equal regardless of insertion order.

use std::collections::BTreeMap;

use carton_core::{AttributeValue, ProductId};

use crate::error::CartError;

/// Reserved attribute name holding the product's primary key.
pub const PK_ATTRIBUTE: &str = "_pk";

/// Caller-supplied variant attributes (size, color, ...).
pub type VariantAttributes = BTreeMap<String, AttributeValue>;

/// Identity of a cart line: product primary key plus variant attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    product_id: ProductId,
    pairs: Vec<(String, AttributeValue)>,
}

impl LineKey {
    /// Build the key for a product and a set of variant attributes.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ReservedAttribute` if `attributes` contains `_pk`.
    pub fn new(product_id: ProductId, attributes: &VariantAttributes) -> Result<Self, CartError> {
        if attributes.contains_key(PK_ATTRIBUTE) {
            return Err(CartError::ReservedAttribute(PK_ATTRIBUTE));
        }
        let pairs = attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .chain(std::iter::once((
                PK_ATTRIBUTE.to_owned(),
                AttributeValue::from(product_id.as_i32()),
            )));
        Ok(Self::canonical(product_id, pairs))
    }

    /// Key for a product with no variant attributes.
    #[must_use]
    pub fn for_product(product_id: ProductId) -> Self {
        Self::canonical(
            product_id,
            std::iter::once((
                PK_ATTRIBUTE.to_owned(),
                AttributeValue::from(product_id.as_i32()),
            )),
        )
    }

    /// Rebuild a key from its stored object form, where `_pk` sits alongside
    /// the variant attributes.
    ///
    /// Returns `None` if `_pk` is missing or is not an `i32` integer.
    #[must_use]
    pub fn from_stored(stored: BTreeMap<String, AttributeValue>) -> Option<Self> {
        let product_id = stored
            .get(PK_ATTRIBUTE)
            .and_then(AttributeValue::as_int)
            .and_then(|pk| i32::try_from(pk).ok())
            .map(ProductId::new)?;
        Some(Self::canonical(product_id, stored))
    }

    fn canonical(
        product_id: ProductId,
        pairs: impl IntoIterator<Item = (String, AttributeValue)>,
    ) -> Self {
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort();
        Self { product_id, pairs }
    }

    /// Primary key of the product this line refers to.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// All pairs in canonical order, `_pk` included.
    #[must_use]
    pub fn pairs(&self) -> &[(String, AttributeValue)] {
        &self.pairs
    }

    /// Variant attributes without the reserved `_pk` entry.
    #[must_use]
    pub fn attributes(&self) -> VariantAttributes {
        self.pairs
            .iter()
            .filter(|(name, _)| name != PK_ATTRIBUTE)
            .cloned()
            .collect()
    }

    /// Object form used in the session blob, `_pk` included.
    #[must_use]
    pub fn to_stored(&self) -> BTreeMap<String, AttributeValue> {
        self.pairs.iter().cloned().collect()
    }
}
