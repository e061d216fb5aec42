//! Session store contract.
//!
//! The hosting environment owns the session; the cart only needs a
//! string-keyed mapping it can read and write, plus a "modified" flag that
//! tells the host the session must be persisted at the end of the request.

use std::collections::HashMap;

use thiserror::Error;

/// Errors reported by a session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backing store could not be reached.
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// A request-scoped, mutable string-to-string mapping.
pub trait SessionStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the backing store cannot be written.
    fn insert(&mut self, key: &str, value: String) -> Result<(), SessionError>;

    /// Flag the session as changed during this request.
    fn mark_modified(&mut self);

    fn is_modified(&self) -> bool;
}

/// In-memory session, for tests and single-process hosts.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, String>,
    modified: bool,
    writes: usize,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a session from existing values. The result is not marked modified.
    #[must_use]
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Number of `insert` calls since creation.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub const fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> HashMap<String, String> {
        self.values
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values.get(key).cloned())
    }

    fn insert(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        self.values.insert(key.to_owned(), value);
        self.writes += 1;
        Ok(())
    }

    fn mark_modified(&mut self) {
        self.modified = true;
    }

    fn is_modified(&self) -> bool {
        self.modified
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_roundtrip() {
        let mut session = MemorySession::new();
        assert_eq!(session.get("CART").unwrap(), None);

        session.insert("CART", "[]".to_string()).unwrap();
        assert_eq!(session.get("CART").unwrap().as_deref(), Some("[]"));
        assert_eq!(session.writes(), 1);
        assert!(!session.is_modified());

        session.mark_modified();
        assert!(session.is_modified());
    }

    #[test]
    fn test_from_values_is_clean() {
        let session =
            MemorySession::from_values(HashMap::from([("CART".to_string(), "[]".to_string())]));
        assert!(!session.is_modified());
        assert_eq!(session.writes(), 0);
        assert_eq!(session.values().len(), 1);
    }
}
