// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;
pub mod state;

// Service configuration
pub mod config;
pub mod prompt;

// Google Cloud credentials
pub mod auth;

// Data backend and its tools
pub mod graphql;

// LLM abstraction layer
pub mod llm;
