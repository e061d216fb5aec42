//! Integration tests for Carton.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p carton-integration-tests
//! ```
//!
//! Each test simulates a sequence of requests sharing one session: a fresh
//! [`carton::Cart`] is loaded per request, exactly as a web handler would.
//!
//! This library holds the collaborators those tests share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cell::Cell;
use std::collections::BTreeSet;

use carton::catalog::SimpleProduct;
use carton::{
    Catalog, CatalogError, MemoryCatalog, ProductLookup, SessionError, SessionStore,
};
use carton_core::ProductId;

/// Catalog of `count` active products with ids `1..=count`.
#[must_use]
pub fn active_catalog(count: i32) -> MemoryCatalog<SimpleProduct> {
    MemoryCatalog::new((1..=count).map(active_product).collect())
}

#[must_use]
pub fn active_product(id: i32) -> SimpleProduct {
    SimpleProduct::new(ProductId::new(id)).with_field("active", true)
}

/// Catalog wrapper that counts queries.
#[derive(Debug)]
pub struct CountingCatalog<C> {
    inner: C,
    queries: Cell<usize>,
}

impl<C> CountingCatalog<C> {
    #[must_use]
    pub const fn new(inner: C) -> Self {
        Self {
            inner,
            queries: Cell::new(0),
        }
    }

    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries.get()
    }
}

impl<C: Catalog> Catalog for CountingCatalog<C> {
    type Product = C::Product;

    fn find_by_primary_keys(
        &self,
        ids: &BTreeSet<ProductId>,
        lookup: &ProductLookup,
    ) -> Result<Vec<Self::Product>, CatalogError> {
        self.queries.set(self.queries.get() + 1);
        self.inner.find_by_primary_keys(ids, lookup)
    }
}

/// Catalog whose every query fails.
#[derive(Debug, Default)]
pub struct OfflineCatalog;

impl Catalog for OfflineCatalog {
    type Product = SimpleProduct;

    fn find_by_primary_keys(
        &self,
        _ids: &BTreeSet<ProductId>,
        _lookup: &ProductLookup,
    ) -> Result<Vec<SimpleProduct>, CatalogError> {
        Err(CatalogError::Query("catalog offline".to_string()))
    }
}

/// Session that can be read but refuses writes.
#[derive(Debug, Default)]
pub struct ReadOnlySession {
    pub stored: Option<String>,
    modified: bool,
}

impl SessionStore for ReadOnlySession {
    fn get(&self, _key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.stored.clone())
    }

    fn insert(&mut self, _key: &str, _value: String) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("session store is read-only".to_string()))
    }

    fn mark_modified(&mut self) {
        self.modified = true;
    }

    fn is_modified(&self) -> bool {
        self.modified
    }
}
