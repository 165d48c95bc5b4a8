//! Named arguments → request buckets.
//!
//! Routes one invocation's argument bag into path substitutions, query
//! parameters, headers, and the body payload, according to the operation's
//! descriptor. Declared parameters are required; body-derived arguments are
//! optional except the single `body`/`file` argument.

use serde_json::{Map, Value};

use crate::error::CallError;
use crate::spec::{BodyKind, OperationDescriptor, ParamLocation};

/// Request body produced by routing.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyPayload {
    None,
    Json(Value),
    Raw(Vec<u8>),
}

/// One invocation's arguments, partitioned and ready to dispatch.
#[derive(Debug, Clone)]
pub struct RoutedArgs {
    pub path_params: Vec<(String, String)>,
    pub query_params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: BodyPayload,
}

/// Plain-string form of a JSON value for path/query/header use: strings are
/// taken as-is (no quotes), everything else via its JSON rendering.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Partition `args` per the descriptor. Arguments not claimed by a declared
/// parameter are body candidates; leftovers beyond those are ignored.
pub fn route(
    descriptor: &OperationDescriptor,
    mut args: Map<String, Value>,
) -> Result<RoutedArgs, CallError> {
    let mut path_params = Vec::new();
    let mut query_params = Vec::new();
    let mut headers = Vec::new();

    for param in &descriptor.params {
        let value = args
            .remove(&param.name)
            .ok_or_else(|| CallError::MissingArgument {
                name: param.name.clone(),
            })?;
        let bucket = match param.location {
            ParamLocation::Path => &mut path_params,
            ParamLocation::Query => &mut query_params,
            ParamLocation::Header => &mut headers,
        };
        bucket.push((param.name.clone(), plain(&value)));
    }

    let body = build_body(descriptor, &mut args)?;

    Ok(RoutedArgs {
        path_params,
        query_params,
        headers,
        body,
    })
}

fn build_body(
    descriptor: &OperationDescriptor,
    args: &mut Map<String, Value>,
) -> Result<BodyPayload, CallError> {
    match &descriptor.body {
        BodyKind::None => Ok(BodyPayload::None),
        BodyKind::JsonRef { .. } => {
            let value = args
                .remove("body")
                .ok_or_else(|| CallError::MissingArgument {
                    name: "body".to_string(),
                })?;
            Ok(BodyPayload::Json(value))
        }
        BodyKind::JsonInline { properties, .. } => {
            // Only supplied properties land in the payload: absent means the
            // key is omitted, an explicit null is forwarded.
            let mut payload = Map::new();
            for prop in properties {
                if let Some(value) = args.remove(prop) {
                    payload.insert(prop.clone(), value);
                }
            }
            Ok(BodyPayload::Json(Value::Object(payload)))
        }
        BodyKind::OctetStream => {
            let value = args
                .remove("file")
                .ok_or_else(|| CallError::MissingArgument {
                    name: "file".to_string(),
                })?;
            Ok(BodyPayload::Raw(raw_bytes(value)?))
        }
    }
}

/// Raw bytes for a `file` argument: a string yields its UTF-8 bytes, an
/// array of integers 0–255 yields those bytes.
fn raw_bytes(value: Value) -> Result<Vec<u8>, CallError> {
    match value {
        Value::String(s) => Ok(s.into_bytes()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .filter(|b| *b <= u8::MAX as u64)
                    .map(|b| b as u8)
                    .ok_or_else(|| CallError::InvalidArgument {
                        name: "file".to_string(),
                        reason: format!("expected a byte (0-255), got {item}"),
                    })
            })
            .collect(),
        other => Err(CallError::InvalidArgument {
            name: "file".to_string(),
            reason: format!("expected a string or byte array, got {other}"),
        }),
    }
}
