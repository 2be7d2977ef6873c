//! The [`Tool`] trait: named callables an agent can invoke mid-reasoning.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A named callable that the agent's LLM can request by name.
///
/// The set of tools wired into a dispatcher is closed: the dispatcher looks
/// requested names up in a fixed map, and every tool validates its arguments
/// against [`parameters_schema`](Tool::parameters_schema) before doing work.
///
/// # Example
///
/// ```rust,ignore
/// use wfi_core::Tool;
///
/// let result = tool.execute(json!({"employee_id": "EMP1001"})).await?;
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// The name the LLM uses to request this tool.
    fn name(&self) -> &str;

    /// A short description surfaced to the LLM in the tool descriptor.
    fn description(&self) -> &str;

    /// JSON schema describing the expected arguments object.
    fn parameters_schema(&self) -> Value;

    /// Run the tool with the given arguments.
    ///
    /// Implementations must validate `args` and fail with
    /// [`CoreError::Validation`](crate::CoreError::Validation) on bad input
    /// rather than producing a partial result.
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Descriptor for a tool as presented to the LLM.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ToolDescriptor {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON schema for the arguments object.
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Build a descriptor from a [`Tool`] implementation.
    pub fn from_tool(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters_schema(),
        }
    }
}
