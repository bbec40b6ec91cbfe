//! JSON parser for the landing page data document.

use anyhow::Result;
use serde_json::Value;

/// Decodes a raw metrics document from bytes.
///
/// Any JSON value is accepted; the calculator decides what it can use.
///
/// # Errors
///
/// Returns an error if the bytes are not valid JSON.
pub fn parse_document(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}
