//! Carton - session-backed shopping cart.
//!
//! A [`Cart`] tracks the products a shopper has selected, keyed by product and
//! an arbitrary set of variant attributes (size, color, ...). Its state lives in
//! a request-scoped [`SessionStore`] as a JSON blob and is rebuilt on every
//! request, reconciling stored lines against a live [`Catalog`].
//!
//! # Modules
//!
//! - [`cart`] - The cart itself: load, mutate, query, persist
//! - [`line`] - A single cart line (product, quantity, unit price)
//! - [`key`] - Canonical line keys built from product and variant attributes
//! - [`wire`] - The serialized session format
//! - [`session`] - Session store contract and an in-memory implementation
//! - [`catalog`] - Product catalog contract and an in-memory implementation
//! - [`config`] - Cart configuration (session key, product lookup filter)
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```rust
//! use carton::{Cart, CartConfig, MemoryCatalog, MemorySession, VariantAttributes};
//! use carton::catalog::SimpleProduct;
//! use carton_core::{Price, ProductId};
//!
//! let shirt = SimpleProduct::new(ProductId::new(1));
//! let catalog = MemoryCatalog::new(vec![shirt.clone()]);
//! let mut session = MemorySession::new();
//! let config = CartConfig::default();
//!
//! let mut cart = Cart::load(&mut session, &catalog, &config).unwrap();
//! let mut size = VariantAttributes::new();
//! size.insert("size".to_string(), "M".into());
//! cart.add(&shirt, Some(Price::parse("9.00").unwrap()), 2, &size).unwrap();
//! assert_eq!(cart.count(), 2);
//! drop(cart);
//!
//! let cart = Cart::load(&mut session, &catalog, &config).unwrap();
//! assert_eq!(cart.total().to_string(), "18.00");
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod key;
pub mod line;
pub mod session;
pub mod wire;

pub use cart::Cart;
pub use catalog::{Catalog, CatalogError, CatalogProduct, MemoryCatalog, ProductLookup};
pub use config::{CartConfig, ConfigError, DEFAULT_SESSION_KEY};
pub use error::{CartError, Result};
pub use key::{LineKey, PK_ATTRIBUTE, VariantAttributes};
pub use line::{CartLine, LineRecord};
pub use session::{MemorySession, SessionError, SessionStore};
