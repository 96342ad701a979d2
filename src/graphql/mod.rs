//! Data backend access
//!
//! A small GraphQL client and the catalog of tools that query matches,
//! players and match events through it.

pub mod catalog;
pub mod client;
pub mod error;
pub mod queries;

pub use catalog::query_registry;
pub use client::{dataconnect_url, GraphqlAuth, GraphqlClient, GraphqlTransport};
pub use error::GraphqlError;
