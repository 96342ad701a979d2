use std::time::Duration;

use crate::llm::core::error::LlmError;

/// Errors that can occur during agent execution
///
/// Tool failures are not here: they are fed back to the model as error
/// results and never end the loop.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Error from the LLM provider
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// LLM stream ended before a stop reason arrived
    #[error("Stream ended unexpectedly")]
    UnexpectedStreamEnd,

    /// Maximum iterations reached without completion
    #[error("Maximum iterations reached ({0})")]
    MaxIterationsReached(usize),

    /// The request ran past its time limit
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}
