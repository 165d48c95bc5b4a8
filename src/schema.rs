//! `$ref` resolution inside an OpenAPI document.
//!
//! References are resolved one hop at a time, on demand. A referenced schema
//! may itself contain further `$ref`s (including back to itself); those are
//! left in place rather than expanded, so self-referential schemas cannot
//! send resolution into a loop.

use serde_json::Value;

use crate::error::RegistryError;

/// Resolve a `#/`-prefixed reference against the document it points into.
///
/// The reference is split on `/` and walked key by key. A missing segment is
/// a spec-authoring bug and aborts registration.
pub fn resolve_ref<'a>(reference: &str, document: &'a Value) -> Result<&'a Value, RegistryError> {
    let mut node = document;
    for segment in reference.trim_start_matches("#/").split('/') {
        node = node
            .get(segment)
            .ok_or_else(|| RegistryError::BadReference {
                reference: reference.to_string(),
                segment: segment.to_string(),
            })?;
    }
    Ok(node)
}

/// Extract the `$ref` string from a schema node, if it is a bare reference.
pub fn ref_target(schema: &Value) -> Option<&str> {
    schema.get("$ref").and_then(|v| v.as_str())
}
