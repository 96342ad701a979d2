//! Core abstractions for the LLM layer

pub mod accumulator;
pub mod config;
pub mod error;
pub mod provider;
pub mod types;
