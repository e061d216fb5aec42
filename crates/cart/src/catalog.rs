//! Product catalog contract.
//!
//! The cart never owns products. At load time it asks the catalog for the
//! products referenced by the stored lines, narrowed by the configured lookup
//! filter, and silently drops any line whose product does not come back.

use std::collections::{BTreeMap, BTreeSet};

use carton_core::{AttributeValue, ProductId};
use thiserror::Error;

/// Equality constraints (`field == value`) a product must satisfy to be
/// eligible for the cart, e.g. `{"active": true}`.
pub type ProductLookup = BTreeMap<String, AttributeValue>;

/// Errors reported by a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product query failed.
    #[error("Product query failed: {0}")]
    Query(String),
}

/// A product as seen by the cart.
pub trait CatalogProduct {
    /// The product's primary key. Two products with the same key are the same product.
    fn primary_key(&self) -> ProductId;

    /// Value of a named field, used to evaluate lookup filters.
    fn field(&self, _name: &str) -> Option<AttributeValue> {
        None
    }
}

/// Source of products, queried by primary key.
pub trait Catalog {
    type Product: CatalogProduct + Clone;

    /// Products whose primary key is in `ids` and which satisfy `lookup`.
    ///
    /// The lookup filter is applied before the primary-key filter; ids with no
    /// matching product are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the underlying query fails.
    fn find_by_primary_keys(
        &self,
        ids: &BTreeSet<ProductId>,
        lookup: &ProductLookup,
    ) -> Result<Vec<Self::Product>, CatalogError>;
}

/// Whether a product satisfies every constraint in `lookup`.
#[must_use]
pub fn matches_lookup<P: CatalogProduct>(product: &P, lookup: &ProductLookup) -> bool {
    lookup
        .iter()
        .all(|(name, expected)| product.field(name).as_ref() == Some(expected))
}

/// Minimal product: a primary key and a bag of named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleProduct {
    pub id: ProductId,
    pub fields: BTreeMap<String, AttributeValue>,
}

impl SimpleProduct {
    #[must_use]
    pub const fn new(id: ProductId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }
}

impl CatalogProduct for SimpleProduct {
    fn primary_key(&self) -> ProductId {
        self.id
    }

    fn field(&self, name: &str) -> Option<AttributeValue> {
        self.fields.get(name).cloned()
    }
}

/// In-memory catalog.
#[derive(Debug, Clone)]
pub struct MemoryCatalog<P> {
    products: Vec<P>,
}

impl<P> Default for MemoryCatalog<P> {
    fn default() -> Self {
        Self {
            products: Vec::new(),
        }
    }
}

impl<P: CatalogProduct + Clone> MemoryCatalog<P> {
    #[must_use]
    pub const fn new(products: Vec<P>) -> Self {
        Self { products }
    }

    /// Add a product, replacing any existing product with the same primary key.
    pub fn insert(&mut self, product: P) {
        self.remove(product.primary_key());
        self.products.push(product);
    }

    /// Delete a product by primary key.
    pub fn remove(&mut self, id: ProductId) -> Option<P> {
        let index = self.products.iter().position(|p| p.primary_key() == id)?;
        Some(self.products.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&P> {
        self.products.iter().find(|p| p.primary_key() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<P: CatalogProduct + Clone> Catalog for MemoryCatalog<P> {
    type Product = P;

    fn find_by_primary_keys(
        &self,
        ids: &BTreeSet<ProductId>,
        lookup: &ProductLookup,
    ) -> Result<Vec<P>, CatalogError> {
        Ok(self
            .products
            .iter()
            .filter(|p| matches_lookup(*p, lookup))
            .filter(|p| ids.contains(&p.primary_key()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> MemoryCatalog<SimpleProduct> {
        MemoryCatalog::new(vec![
            SimpleProduct::new(ProductId::new(1)).with_field("active", true),
            SimpleProduct::new(ProductId::new(2)).with_field("active", false),
            SimpleProduct::new(ProductId::new(3)).with_field("active", true),
        ])
    }

    fn ids(values: &[i32]) -> BTreeSet<ProductId> {
        values.iter().copied().map(ProductId::new).collect()
    }

    #[test]
    fn test_find_by_primary_keys() {
        let found = catalog()
            .find_by_primary_keys(&ids(&[1, 2, 9]), &ProductLookup::new())
            .unwrap();
        let found: Vec<_> = found.iter().map(CatalogProduct::primary_key).collect();
        assert_eq!(found, vec![ProductId::new(1), ProductId::new(2)]);
    }

    #[test]
    fn test_lookup_filter_applied() {
        let lookup = ProductLookup::from([("active".to_string(), AttributeValue::Bool(true))]);
        let found = catalog()
            .find_by_primary_keys(&ids(&[1, 2, 3]), &lookup)
            .unwrap();
        let found: Vec<_> = found.iter().map(CatalogProduct::primary_key).collect();
        assert_eq!(found, vec![ProductId::new(1), ProductId::new(3)]);
    }

    #[test]
    fn test_missing_field_fails_lookup() {
        let product = SimpleProduct::new(ProductId::new(1));
        let lookup = ProductLookup::from([("active".to_string(), AttributeValue::Bool(true))]);
        assert!(!matches_lookup(&product, &lookup));
        assert!(matches_lookup(&product, &ProductLookup::new()));
    }

    #[test]
    fn test_insert_replaces_and_remove() {
        let mut catalog = catalog();
        catalog.insert(SimpleProduct::new(ProductId::new(2)).with_field("active", true));
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get(ProductId::new(2)).unwrap().field("active"),
            Some(AttributeValue::Bool(true))
        );

        assert!(catalog.remove(ProductId::new(2)).is_some());
        assert!(catalog.remove(ProductId::new(2)).is_none());
        assert_eq!(catalog.len(), 2);
    }
}
