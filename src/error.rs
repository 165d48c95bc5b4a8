//! Error types for the openapi-bridge crate.
//!
//! Registration-time failures ([`RegistryError`]) are fatal: the registry
//! must not become visible with a broken or partial tool set. Call-time
//! failures ([`CallError`]) are returned to the invoking caller and never
//! retried.

use thiserror::Error;

/// Errors raised while building descriptors and registering tools.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("unresolvable reference `{reference}`: no such segment `{segment}`")]
    BadReference { reference: String, segment: String },

    #[error("duplicate operation id `{operation_id}`")]
    DuplicateOperationId { operation_id: String },
}

/// Errors raised while invoking a registered tool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CallError {
    #[error("missing required argument `{name}`")]
    MissingArgument { name: String },

    #[error("argument `{name}` is unusable: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("request body validation failed: {detail}")]
    Validation { detail: String },

    #[error("unsupported HTTP method: {method}")]
    UnsupportedMethod { method: String },

    #[error("HTTP {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("HTTP request failed")]
    Transport(#[source] reqwest::Error),

    #[error("response body is not valid JSON")]
    Decode(#[source] serde_json::Error),

    #[error("no tool registered under `{name}`")]
    UnknownTool { name: String },
}
