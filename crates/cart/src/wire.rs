//! Serialized cart format.
//!
//! The session holds a JSON array with one object per line:
//!
//! ```json
//! [
//!   { "key":   { "_pk": 1, "size": "M" },
//!     "value": { "quantity": 2, "price": "10.00" } }
//! ]
//! ```
//!
//! Prices are written as decimal strings; numbers are accepted on read.

use std::collections::BTreeMap;

use carton_core::AttributeValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key::LineKey;
use crate::line::{CartLine, LineRecord};

/// Reasons a stored blob cannot be decoded.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid cart JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {0} has no integer '_pk' in its key")]
    MissingPrimaryKey(usize),
    #[error("line {0} has a quantity of zero")]
    ZeroQuantity(usize),
}

/// One element of the serialized array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLine {
    pub key: BTreeMap<String, AttributeValue>,
    pub value: LineRecord,
}

/// Encode lines into the session format, preserving their order.
///
/// # Errors
///
/// Returns `serde_json::Error` if encoding fails.
pub fn encode<'a, P: 'a>(
    lines: impl IntoIterator<Item = &'a CartLine<P>>,
) -> Result<String, serde_json::Error> {
    let stored: Vec<StoredLine> = lines
        .into_iter()
        .map(|line| StoredLine {
            key: line.key().to_stored(),
            value: line.to_record(),
        })
        .collect();
    serde_json::to_string(&stored)
}

/// Decode a session blob into keys and records, in stored order.
///
/// A blank blob or an empty JSON object decodes to no lines.
///
/// # Errors
///
/// Returns `WireError` if the blob is not a well-formed cart.
pub fn decode(blob: &str) -> Result<Vec<(LineKey, LineRecord)>, WireError> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(blob)?;
    if value.as_object().is_some_and(serde_json::Map::is_empty) {
        return Ok(Vec::new());
    }

    let stored: Vec<StoredLine> = serde_json::from_value(value)?;
    stored
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            if line.value.quantity == 0 {
                return Err(WireError::ZeroQuantity(index));
            }
            let key = LineKey::from_stored(line.key).ok_or(WireError::MissingPrimaryKey(index))?;
            Ok((key, line.value))
        })
        .collect()
}
