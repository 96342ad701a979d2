//! Tool execution framework
//!
//! This module provides the infrastructure for executing tool calls from LLMs:
//! the `ToolExecutor` trait and the `ToolRegistry` that pairs each tool
//! declaration with its handler.

pub mod declaration;
pub mod executor;
pub mod registry;

pub use declaration::create_tool_declaration;
pub use executor::ToolExecutor;
pub use registry::{RegistryError, ToolRegistration, ToolRegistry};
