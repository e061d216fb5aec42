//! Cart configuration.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_SESSION_KEY` - Session key the cart is stored under (default: `CART`)
//! - `CART_PRODUCT_LOOKUP` - JSON object of `field: value` constraints a product
//!   must satisfy to stay in the cart (e.g. `{"active": true}`)

use carton_core::AttributeValue;
use thiserror::Error;

use crate::catalog::ProductLookup;

/// Session key used when none is configured.
pub const DEFAULT_SESSION_KEY: &str = "CART";

const SESSION_KEY_VAR: &str = "CART_SESSION_KEY";
const PRODUCT_LOOKUP_VAR: &str = "CART_PRODUCT_LOOKUP";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Per-cart configuration, passed explicitly to [`crate::Cart::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Session key the serialized cart lives under.
    pub session_key: String,
    /// Constraints narrowing which catalog products may appear in the cart.
    pub product_lookup: ProductLookup,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            session_key: DEFAULT_SESSION_KEY.to_owned(),
            product_lookup: ProductLookup::new(),
        }
    }
}

impl CartConfig {
    /// Use a different session key, e.g. `"wishlist"` for a second cart in
    /// the same session.
    #[must_use]
    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = session_key.into();
        self
    }

    /// Add a `field == value` constraint to the product lookup.
    #[must_use]
    pub fn with_lookup(mut self, field: &str, value: impl Into<AttributeValue>) -> Self {
        self.product_lookup.insert(field.to_owned(), value.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the session key is blank or the
    /// lookup is not a JSON object of scalar values.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let session_key = match get(SESSION_KEY_VAR) {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    SESSION_KEY_VAR.to_string(),
                    "must not be empty".to_string(),
                ));
            }
            Some(value) => value,
            None => DEFAULT_SESSION_KEY.to_owned(),
        };

        let product_lookup = match get(PRODUCT_LOOKUP_VAR) {
            Some(raw) => serde_json::from_str::<ProductLookup>(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar(PRODUCT_LOOKUP_VAR.to_string(), e.to_string())
            })?,
            None => ProductLookup::new(),
        };

        Ok(Self {
            session_key,
            product_lookup,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CartConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, CartConfig::default());
        assert_eq!(config.session_key, "CART");
        assert!(config.product_lookup.is_empty());
    }

    #[test]
    fn test_session_key_override() {
        let config = CartConfig::from_vars(vars(&[("CART_SESSION_KEY", "wishlist")])).unwrap();
        assert_eq!(config.session_key, "wishlist");
    }

    #[test]
    fn test_blank_session_key_rejected() {
        let result = CartConfig::from_vars(vars(&[("CART_SESSION_KEY", "  ")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_product_lookup_parsed() {
        let config = CartConfig::from_vars(vars(&[(
            "CART_PRODUCT_LOOKUP",
            r#"{"active": true, "store": "eu"}"#,
        )]))
        .unwrap();
        assert_eq!(
            config.product_lookup,
            CartConfig::default()
                .with_lookup("active", true)
                .with_lookup("store", "eu")
                .product_lookup
        );
    }

    #[test]
    fn test_product_lookup_invalid() {
        let result = CartConfig::from_vars(vars(&[("CART_PRODUCT_LOOKUP", "[1, 2]")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(name, _)) if name == "CART_PRODUCT_LOOKUP"));
    }

    #[test]
    fn test_builders() {
        let config = CartConfig::default().with_session_key("wishlist");
        assert_eq!(config.session_key, "wishlist");
    }
}
