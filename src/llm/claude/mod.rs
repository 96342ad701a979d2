//! Claude provider implementation
//!
//! Talks to Anthropic Claude models either through Google Cloud Vertex AI or
//! directly through the Anthropic API.

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::{ClaudeClient, ClaudeEndpoint, ClaudeModel};
