//! Field extraction from a terminal analysis result.
//!
//! Extraction is total: a structurally valid result always yields a fully
//! populated field map, with the empty string standing in for any slot whose
//! source key is absent or carries the wrong typed sub-value.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::schema::{FieldKind, NOTICE_FIELDS};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("analysis result is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("analysis result does not carry a succeeded status")]
    NotSucceeded,
    #[error("analysis result has no fields object under result.contents[0]")]
    MalformedResult,
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// Flat mapping from metadata key to extracted value, one entry per schema slot.
pub type FieldMap = BTreeMap<String, String>;

/// Extract the fixed field schema from a raw job result.
///
/// The result must carry `status: "Succeeded"` and an object at
/// `result.contents[0].fields`; anything else is an error with no partial
/// fields. Per-slot misses are not errors.
pub fn extract_fields(raw: &str) -> ExtractResult<FieldMap> {
    let root: Value = serde_json::from_str(raw)?;

    if root.get("status").and_then(Value::as_str) != Some("Succeeded") {
        return Err(ExtractError::NotSucceeded);
    }

    let fields = root
        .get("result")
        .and_then(|result| result.get("contents"))
        .and_then(|contents| contents.get(0))
        .and_then(|content| content.get("fields"))
        .filter(|fields| fields.is_object())
        .ok_or(ExtractError::MalformedResult)?;

    let mut out = FieldMap::new();
    for spec in NOTICE_FIELDS {
        let value = fields
            .get(spec.source)
            .and_then(|slot| slot.get(spec.kind.value_key()))
            .map_or_else(String::new, |value| render_value(spec.kind, value));
        out.insert(spec.metadata_key.to_string(), value);
    }

    Ok(out)
}

/// Render one typed sub-value as its metadata string.
///
/// Numbers go through `f64` `Display`, which is locale-independent and stable
/// across calls. Booleans render lowercase.
fn render_value(kind: FieldKind, value: &Value) -> String {
    match kind {
        FieldKind::Text | FieldKind::Date => {
            value.as_str().map_or_else(String::new, ToString::to_string)
        }
        FieldKind::Number => value
            .as_f64()
            .map_or_else(String::new, |number| number.to_string()),
        FieldKind::Boolean => value
            .as_bool()
            .map_or_else(String::new, |flag| flag.to_string()),
    }
}
