//! CLI command implementations.

pub mod cart;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read or written.
    #[error("I/O error on {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    /// A file did not contain the expected JSON.
    #[error("Invalid JSON in {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] carton::ConfigError),

    /// A cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] carton::CartError),

    /// The product is not in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(carton_core::ProductId),
}
