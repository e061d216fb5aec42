//! Cart error types.
//!
//! Every failure is local and synchronous: validation errors are raised before
//! any state changes, and collaborator failures (session, catalog) propagate
//! unmodified.

use carton_core::{PriceError, ProductId};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::session::SessionError;

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line was created or added to with a quantity below one.
    #[error("Quantity must be at least 1 (got {0})")]
    InvalidQuantity(u32),

    /// A new line was added without a price.
    #[error("Missing price when adding product {0} to cart")]
    MissingPrice(ProductId),

    /// Adding units would push a line's quantity past `u32::MAX`.
    #[error("Quantity of product {0} would exceed {max}", max = u32::MAX)]
    QuantityOverflow(ProductId),

    /// A line subtotal or the cart total would exceed the largest price.
    #[error("Cart amount would exceed the largest representable price")]
    AmountOverflow,

    /// A price could not be parsed.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// A caller used the reserved primary-key attribute name as a variant attribute.
    #[error("Variant attribute '{0}' is reserved")]
    ReservedAttribute(&'static str),

    /// The blob stored in the session could not be decoded.
    #[error("Corrupt cart state under session key '{key}': {reason}")]
    CorruptCartState { key: String, reason: String },

    /// The cart could not be encoded for the session.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The session store failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The product catalog failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
