//! Bridge an OpenAPI document to a registry of callable tools.
//!
//! Parses an OpenAPI JSON document, derives one immutable descriptor per
//! declared operation, and registers one async callable per operation id
//! into a consumer-supplied [`ToolHost`]. Each callable routes its named
//! arguments into path/query/header/body, validates the JSON body against
//! the declared schema, and performs the HTTP call.
//!
//! # Usage
//!
//! ```no_run
//! use openapi_bridge::{http_client, register_operations, BridgeConfig, ToolSet};
//!
//! let raw = std::fs::read_to_string("openapi.json").unwrap();
//! let document: serde_json::Value = serde_json::from_str(&raw).unwrap();
//!
//! let config = BridgeConfig::new(
//!     "https://petstore3.swagger.io/api/v3",
//!     "petstore-bridge/1.0",
//! );
//!
//! let mut tools = ToolSet::new();
//! register_operations(&mut tools, http_client().unwrap(), config, &document).unwrap();
//! ```
//!
//! # Name collisions
//!
//! When an inline body property shares its name with a declared
//! path/query/header parameter, the parameter claims the name and the body
//! property is not exposed as an argument. Such specs are ambiguous;
//! silently renaming either side would be worse, so the collision is kept
//! visible here instead.

pub mod args;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod schema;
pub mod spec;
pub mod validate;

pub use args::{plain, route, BodyPayload, RoutedArgs};
pub use dispatch::{dispatch, http_client, BridgeConfig, REQUEST_TIMEOUT};
pub use error::{CallError, RegistryError};
pub use registry::{invoke, register_operations, Tool, ToolHandler, ToolHost, ToolSet};
pub use schema::resolve_ref;
pub use spec::{
    build_descriptor, walk_operations, ArgKind, ArgSpec, BodyKind, OperationDescriptor, Param,
    ParamLocation,
};
pub use validate::validate_body;

// Re-export dependencies for downstream crates
pub use reqwest;
pub use serde_json;
