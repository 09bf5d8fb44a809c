//! Tool-calling seam between the intent parser and hosted models

use crate::core::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A callable operation offered to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub input_schema: Value,
}

/// An operation the model chose to invoke
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    /// Raw, unvalidated arguments as returned by the model
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// A language model that can be offered tools
///
/// Free-form text in the response is not surfaced; only invocations are.
#[async_trait]
pub trait ToolCallingModel: Send + Sync {
    async fn invoke_tools(
        &self,
        system: &str,
        user: &str,
        tools: &[ToolSpec],
    ) -> Result<Vec<ToolInvocation>>;
}
