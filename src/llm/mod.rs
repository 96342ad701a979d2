//! LLM Abstraction Layer
//!
//! A provider-neutral interface over Anthropic Claude (through Vertex AI or
//! the Anthropic API), the tool registry, and the agent loop that ties them
//! together.

pub mod agent;
pub mod claude;
pub mod core;
pub mod tools;

// Re-export commonly used types
pub use agent::{Agent, AgentError, AgentEvent};
pub use core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{
        ContentBlock, ContentDelta, FinishReason, GenerateRequest, GenerateResponse, Message,
        MessageRole, StreamEvent, ToolCall, ToolDeclaration, UsageMetadata,
    },
};
pub use tools::{RegistryError, ToolExecutor, ToolRegistration, ToolRegistry};
