//! Carton Core - Shared types library.
//!
//! This crate provides the value types used across all Carton components:
//! - `carton` - Session-backed shopping cart library
//! - `carton-cli` - Command-line driver for inspecting and editing carts
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no session access, no catalog
//! queries. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, and variant attribute values

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
