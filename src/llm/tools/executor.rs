//! Tool executor trait

use async_trait::async_trait;

/// Trait for executing tool calls from the LLM
///
/// The trait accepts the tool use ID, function name, and arguments as a JSON
/// value, and returns either the serialized result or an error message. It
/// never panics on bad input: unknown names and malformed arguments are
/// ordinary `Err` values that end up in the conversation.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool call
    ///
    /// * `Ok(String)` - Successful execution result (JSON string)
    /// * `Err(String)` - Error message describing what went wrong
    async fn execute(
        &self,
        tool_use_id: String,
        name: String,
        arguments: serde_json::Value,
    ) -> Result<String, String>;
}
