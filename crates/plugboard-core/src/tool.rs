//! Tool descriptors.

use async_trait::async_trait;
use schemars::JsonSchema;
use std::fmt;
use std::sync::Arc;

use plugboard_protocols::{RegistryError, Result, ToolOutput};

use crate::lifecycle::Lifecycle;
use crate::root::Registry;

/// Package name reported for tools registered without an owner.
pub const UNKNOWN_PACKAGE: &str = "unknown";

/// Executes a tool invocation. What a tool does is up to its package.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, input: serde_json::Value, ctx: &Registry) -> Result<ToolOutput>;
}

/// A tool as declared by a package.
#[derive(Clone)]
pub struct ToolDefinition {
    pub description: String,
    pub executor: Arc<dyn ToolExecutor>,
    /// JSON Schema for the input.
    pub input_schema: serde_json::Value,
    pub lifecycle: Option<Arc<dyn Lifecycle>>,
}

impl ToolDefinition {
    pub fn new(description: impl Into<String>, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            description: description.into(),
            executor,
            input_schema: empty_object_schema(),
            lifecycle: None,
        }
    }

    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Derives the input schema from a Rust type.
    pub fn with_schema_for<T: JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.input_schema = serde_json::to_value(schema).unwrap_or_else(|_| empty_object_schema());
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn Lifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("has_lifecycle", &self.lifecycle.is_some())
            .finish()
    }
}

/// A tool held by the [`ToolRegistry`](crate::registry::ToolRegistry),
/// stamped with its name and owning package.
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub name: String,
    pub package_name: Option<String>,
    pub definition: ToolDefinition,
}

impl RegisteredTool {
    pub fn new(name: impl Into<String>, definition: ToolDefinition) -> Self {
        Self {
            name: name.into(),
            package_name: None,
            definition,
        }
    }

    pub fn with_package(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn package_name(&self) -> &str {
        self.package_name.as_deref().unwrap_or(UNKNOWN_PACKAGE)
    }

    pub fn description(&self) -> &str {
        &self.definition.description
    }

    /// Checks the input against the schema's top-level type.
    pub fn validate(&self, input: &serde_json::Value) -> Result<()> {
        let schema = &self.definition.input_schema;
        if schema.get("type") == Some(&serde_json::json!("object")) && !input.is_object() {
            return Err(RegistryError::InvalidInput(format!(
                "{}: parameters must be an object",
                self.name
            )));
        }
        Ok(())
    }

    pub async fn execute(&self, input: serde_json::Value, ctx: &Registry) -> Result<ToolOutput> {
        self.validate(&input)?;
        self.definition.executor.execute(input, ctx).await
    }
}

fn empty_object_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {},
        "required": []
    })
}
