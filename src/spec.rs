//! OpenAPI spec → operation descriptors.
//!
//! Walks a parsed OpenAPI JSON document and derives one immutable
//! [`OperationDescriptor`] per declared operation. Descriptors carry
//! everything call time needs: parameter declarations, the request-body
//! kind, and the synthesized argument signature.

use serde_json::Value;

use crate::error::RegistryError;
use crate::schema::{ref_target, resolve_ref};

/// Where a declared parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

/// A single declared parameter. All declared parameters are required.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub location: ParamLocation,
}

/// Request-body shape of an operation.
#[derive(Debug, Clone)]
pub enum BodyKind {
    /// No request body.
    None,
    /// `application/json` body declared as a `$ref`; the whole payload is
    /// passed as one `body` argument. `schema` is the resolved target.
    JsonRef { schema: Value },
    /// Inline `application/json` schema; each top-level property becomes its
    /// own optional argument. `schema` is kept verbatim for validation.
    JsonInline {
        properties: Vec<String>,
        schema: Value,
    },
    /// `application/octet-stream` body: a single required `file` argument
    /// carrying raw bytes.
    OctetStream,
}

impl BodyKind {
    /// Schema to validate the constructed JSON payload against, if any.
    /// A JSON media type declared without a schema yields none.
    pub fn schema(&self) -> Option<&Value> {
        match self {
            BodyKind::JsonRef { schema } | BodyKind::JsonInline { schema, .. } => {
                (!schema.is_null()).then_some(schema)
            }
            _ => None,
        }
    }
}

/// Role of one argument in the synthesized signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Path,
    Query,
    Header,
    /// Whole JSON payload (`body` argument of a `$ref` body).
    Body,
    /// One top-level property of an inline JSON body.
    BodyProp,
    /// Raw bytes (`file` argument of an octet-stream body).
    File,
}

/// One entry of a tool's declared parameter list, consumed by the hosting
/// registry for documentation and argument checking.
#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub name: String,
    pub required: bool,
    pub kind: ArgKind,
}

/// Resolved, immutable metadata for one operation.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// operationId from the spec (e.g. "addPet")
    pub operation_id: String,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// URL path template (e.g. "/pet/{petId}")
    pub path: String,
    /// Summary text (falls back to description)
    pub summary: String,
    /// Declared path/query/header parameters, document order
    pub params: Vec<Param>,
    /// Request-body shape
    pub body: BodyKind,
}

impl OperationDescriptor {
    /// Synthesize the declared argument list: parameters first, then
    /// body-derived arguments. Body properties shadowed by a parameter name
    /// are left out; the parameter wins that name and the property is
    /// unreachable (see crate docs).
    pub fn signature(&self) -> Vec<ArgSpec> {
        let mut sig: Vec<ArgSpec> = self
            .params
            .iter()
            .map(|p| ArgSpec {
                name: p.name.clone(),
                required: true,
                kind: match p.location {
                    ParamLocation::Path => ArgKind::Path,
                    ParamLocation::Query => ArgKind::Query,
                    ParamLocation::Header => ArgKind::Header,
                },
            })
            .collect();

        match &self.body {
            BodyKind::None => {}
            BodyKind::JsonRef { .. } => sig.push(ArgSpec {
                name: "body".to_string(),
                required: true,
                kind: ArgKind::Body,
            }),
            BodyKind::JsonInline { properties, .. } => {
                for prop in properties {
                    if self.params.iter().any(|p| &p.name == prop) {
                        continue;
                    }
                    sig.push(ArgSpec {
                        name: prop.clone(),
                        required: false,
                        kind: ArgKind::BodyProp,
                    });
                }
            }
            BodyKind::OctetStream => sig.push(ArgSpec {
                name: "file".to_string(),
                required: true,
                kind: ArgKind::File,
            }),
        }

        sig
    }
}

/// Walk every `(path, method, operation)` triple in document order.
///
/// Methods within a path item are visited in a fixed canonical order, not
/// key order, so the walk is deterministic across documents.
pub fn walk_operations(document: &Value) -> Vec<(&str, &str, &Value)> {
    let mut ops = Vec::new();

    let paths = match document.get("paths").and_then(|p| p.as_object()) {
        Some(p) => p,
        None => return ops,
    };

    for (path, path_item) in paths {
        for method in &[
            "get", "post", "put", "patch", "delete", "head", "options", "trace",
        ] {
            if let Some(operation) = path_item.get(*method) {
                ops.push((path.as_str(), *method, operation));
            }
        }
    }

    ops
}

/// Build the descriptor for one operation.
///
/// Returns `Ok(None)` when the operation has no `operationId`: such
/// operations are deliberately not exposed. A `$ref` body schema is resolved
/// here, once, so a dangling reference fails registration rather than every
/// call.
pub fn build_descriptor(
    path: &str,
    method: &str,
    operation: &Value,
    document: &Value,
) -> Result<Option<OperationDescriptor>, RegistryError> {
    let operation_id = operation
        .get("operationId")
        .and_then(|v| v.as_str())
        .unwrap_or("");

    if operation_id.is_empty() {
        return Ok(None);
    }

    let summary = operation
        .get("summary")
        .or_else(|| operation.get("description"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let params = collect_params(operation.get("parameters"));
    let body = build_body_kind(operation, document)?;

    Ok(Some(OperationDescriptor {
        operation_id: operation_id.to_string(),
        method: method.to_uppercase(),
        path: path.to_string(),
        summary,
        params,
        body,
    }))
}

/// Read the declared parameter list. Locations other than path/query/header
/// (e.g. cookie) are ignored.
fn collect_params(declared: Option<&Value>) -> Vec<Param> {
    let mut params = Vec::new();

    if let Some(list) = declared.and_then(|v| v.as_array()) {
        for entry in list {
            let name = entry.get("name").and_then(|v| v.as_str());
            let location = entry.get("in").and_then(|v| v.as_str());
            let (name, location) = match (name, location) {
                (Some(n), Some(l)) => (n, l),
                _ => continue,
            };
            let location = match location {
                "path" => ParamLocation::Path,
                "query" => ParamLocation::Query,
                "header" => ParamLocation::Header,
                _ => continue,
            };
            params.push(Param {
                name: name.to_string(),
                location,
            });
        }
    }

    params
}

/// Decide the body kind from `requestBody.content`. `application/json`
/// takes precedence over `application/octet-stream`.
fn build_body_kind(operation: &Value, document: &Value) -> Result<BodyKind, RegistryError> {
    let content = operation
        .get("requestBody")
        .and_then(|rb| rb.get("content"));

    let content = match content {
        Some(c) => c,
        None => return Ok(BodyKind::None),
    };

    if let Some(media) = content.get("application/json") {
        let schema = media.get("schema").cloned().unwrap_or(Value::Null);
        if let Some(reference) = ref_target(&schema) {
            let resolved = resolve_ref(reference, document)?.clone();
            return Ok(BodyKind::JsonRef { schema: resolved });
        }
        let properties = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default();
        return Ok(BodyKind::JsonInline { properties, schema });
    }

    if content.get("application/octet-stream").is_some() {
        return Ok(BodyKind::OctetStream);
    }

    Ok(BodyKind::None)
}
