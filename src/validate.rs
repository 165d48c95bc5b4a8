//! Request-body validation against the declared JSON schema.
//!
//! The schema is used verbatim: individual keywords are interpreted by the
//! `jsonschema` crate, not here. Only constructed JSON payloads are
//! validated; raw-byte bodies and path/query/header values never are.

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::CallError;

/// Validate a constructed body payload against its schema.
///
/// Diagnostics from the underlying validator are passed through verbatim so
/// the caller sees exactly why the body was rejected. The schema is compiled
/// per call; a schema that does not compile rejects the call the same way.
pub fn validate_body(payload: &Value, schema: &Value) -> Result<(), CallError> {
    let compiled = JSONSchema::compile(schema).map_err(|e| CallError::Validation {
        detail: e.to_string(),
    })?;

    if let Err(errors) = compiled.validate(payload) {
        let detail = errors
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CallError::Validation { detail });
    }

    Ok(())
}
