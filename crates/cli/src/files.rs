//! File-backed session and catalog.
//!
//! The session file is a JSON object of string values, the same shape a web
//! framework would keep server-side. The catalog file is a JSON array of
//! products:
//!
//! ```json
//! [
//!   { "id": 1, "name": "Pineapple Tee", "price": "25.00", "active": true }
//! ]
//! ```
//!
//! Extra boolean, integer, and string fields are available to the product
//! lookup filter. Other fields (floats, arrays, objects, `null`) are ignored.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use carton::{CatalogProduct, MemoryCatalog, MemorySession, SessionError, SessionStore};
use carton_core::{AttributeValue, Price, ProductId};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::commands::CliError;

/// A catalog product read from the catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawCatalogEntry")]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    /// List price, used when `add` is not given an explicit price.
    pub price: Option<Price>,
    /// Other scalar fields, available to the product lookup filter.
    pub fields: BTreeMap<String, AttributeValue>,
}

#[derive(Deserialize)]
struct RawCatalogEntry {
    id: ProductId,
    name: String,
    #[serde(default)]
    price: Option<Price>,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl From<RawCatalogEntry> for CatalogEntry {
    fn from(raw: RawCatalogEntry) -> Self {
        let fields = raw
            .fields
            .into_iter()
            .filter_map(|(name, value)| scalar(value).map(|value| (name, value)))
            .collect();
        Self {
            id: raw.id,
            name: raw.name,
            price: raw.price,
            fields,
        }
    }
}

fn scalar(value: Value) -> Option<AttributeValue> {
    match value {
        Value::Bool(b) => Some(AttributeValue::Bool(b)),
        Value::Number(n) => n.as_i64().map(AttributeValue::Int),
        Value::String(s) => Some(AttributeValue::Str(s)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl CatalogProduct for CatalogEntry {
    fn primary_key(&self) -> ProductId {
        self.id
    }

    fn field(&self, name: &str) -> Option<AttributeValue> {
        match name {
            "name" => Some(AttributeValue::from(self.name.as_str())),
            _ => self.fields.get(name).cloned(),
        }
    }
}

/// Read the catalog file.
///
/// # Errors
///
/// Returns `CliError` if the file cannot be read or parsed.
pub fn load_catalog(path: &Path) -> Result<MemoryCatalog<CatalogEntry>, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Io(path.to_owned(), e))?;
    let entries: Vec<CatalogEntry> =
        serde_json::from_str(&content).map_err(|e| CliError::Parse(path.to_owned(), e))?;
    debug!(path = %path.display(), products = entries.len(), "Loaded catalog");
    Ok(MemoryCatalog::new(entries))
}

/// A session persisted to a JSON file between invocations.
#[derive(Debug)]
pub struct FileSession {
    path: PathBuf,
    inner: MemorySession,
}

impl FileSession {
    /// Open the session file, starting empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, CliError> {
        let values: HashMap<String, String> = match std::fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| CliError::Parse(path.to_owned(), e))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(CliError::Io(path.to_owned(), e)),
        };
        Ok(Self {
            path: path.to_owned(),
            inner: MemorySession::from_values(values),
        })
    }

    /// Write the session back if anything changed it.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the file cannot be written.
    pub fn persist(&self) -> Result<(), CliError> {
        if !self.inner.is_modified() {
            debug!(path = %self.path.display(), "Session unchanged");
            return Ok(());
        }
        let content = serde_json::to_string_pretty(self.inner.values())
            .map_err(|e| CliError::Parse(self.path.clone(), e))?;
        std::fs::write(&self.path, content).map_err(|e| CliError::Io(self.path.clone(), e))?;
        debug!(path = %self.path.display(), "Session written");
        Ok(())
    }
}

impl SessionStore for FileSession {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.inner.get(key)
    }

    fn insert(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        self.inner.insert(key, value)
    }

    fn mark_modified(&mut self) {
        self.inner.mark_modified();
    }

    fn is_modified(&self) -> bool {
        self.inner.is_modified()
    }
}
