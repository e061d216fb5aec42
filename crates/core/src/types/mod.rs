//! Core types for Carton.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod attribute;
pub mod id;
pub mod price;

pub use attribute::AttributeValue;
pub use id::*;
pub use price::{Price, PriceError};
