//! Descriptors → registered callables.
//!
//! Walks every operation in the document, synthesizes an async handler per
//! operation id, and registers it with the hosting registry. Registration
//! runs once at startup and either completes fully or fails; no partial
//! tool set is ever exposed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tracing::debug;

use crate::args::{route, BodyPayload};
use crate::dispatch::{dispatch, BridgeConfig};
use crate::error::{CallError, RegistryError};
use crate::spec::{build_descriptor, walk_operations, ArgSpec, OperationDescriptor};
use crate::validate::validate_body;

/// Boxed async invocation function of one registered tool.
pub type ToolHandler = Box<
    dyn Fn(Map<String, Value>) -> BoxFuture<'static, Result<Option<Value>, CallError>>
        + Send
        + Sync,
>;

/// Hosting registry interface. The embedding protocol (an MCP server, a
/// test harness, ...) implements this; the bridge only feeds it.
pub trait ToolHost {
    fn register(
        &mut self,
        name: &str,
        signature: Vec<ArgSpec>,
        description: &str,
        handler: ToolHandler,
    );
}

/// Invoke one operation: route arguments, validate the JSON body if a
/// schema is declared, then dispatch. Handlers close over this.
pub async fn invoke(
    client: &reqwest::Client,
    config: &BridgeConfig,
    descriptor: &OperationDescriptor,
    args: Map<String, Value>,
) -> Result<Option<Value>, CallError> {
    let routed = route(descriptor, args)?;

    if let (BodyPayload::Json(payload), Some(schema)) = (&routed.body, descriptor.body.schema()) {
        validate_body(payload, schema)?;
    }

    dispatch(client, config, &descriptor.method, &descriptor.path, routed).await
}

/// Register one callable per operation id found in the document.
///
/// Operations without an id are skipped. A duplicate id or a dangling body
/// reference fails the whole registration before anything reaches the host.
/// Returns the number of tools registered.
pub fn register_operations(
    host: &mut impl ToolHost,
    client: reqwest::Client,
    config: BridgeConfig,
    document: &Value,
) -> Result<usize, RegistryError> {
    // Build every descriptor up front so a broken spec registers nothing.
    let mut descriptors = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for (path, method, operation) in walk_operations(document) {
        let descriptor = match build_descriptor(path, method, operation, document)? {
            Some(d) => d,
            None => continue,
        };
        if !seen.insert(descriptor.operation_id.clone()) {
            return Err(RegistryError::DuplicateOperationId {
                operation_id: descriptor.operation_id,
            });
        }
        descriptors.push(descriptor);
    }

    let config = Arc::new(config);
    let count = descriptors.len();

    for descriptor in descriptors {
        let name = descriptor.operation_id.clone();
        let signature = descriptor.signature();
        let summary = descriptor.summary.clone();

        let descriptor = Arc::new(descriptor);
        let client = client.clone();
        let config = Arc::clone(&config);
        let handler: ToolHandler = Box::new(move |args| {
            let descriptor = Arc::clone(&descriptor);
            let client = client.clone();
            let config = Arc::clone(&config);
            Box::pin(async move { invoke(&client, &config, &descriptor, args).await })
        });

        debug!(operation_id = %name, "registering tool");
        host.register(&name, signature, &summary, handler);
    }

    debug!(count, "registration complete");
    Ok(count)
}

/// One registered tool as held by [`ToolSet`].
pub struct Tool {
    pub signature: Vec<ArgSpec>,
    pub description: String,
    handler: ToolHandler,
}

/// Minimal in-memory [`ToolHost`]. Lets the bridge be exercised without an
/// external hosting protocol; invocations borrow shared state immutably, so
/// any number may run concurrently.
#[derive(Default)]
pub struct ToolSet {
    tools: HashMap<String, Tool>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a registered tool by name.
    pub async fn call(
        &self,
        name: &str,
        args: Map<String, Value>,
    ) -> Result<Option<Value>, CallError> {
        let tool = self.tools.get(name).ok_or_else(|| CallError::UnknownTool {
            name: name.to_string(),
        })?;
        (tool.handler)(args).await
    }
}

impl ToolHost for ToolSet {
    fn register(
        &mut self,
        name: &str,
        signature: Vec<ArgSpec>,
        description: &str,
        handler: ToolHandler,
    ) {
        self.tools.insert(
            name.to_string(),
            Tool {
                signature,
                description: description.to_string(),
                handler,
            },
        );
    }
}
