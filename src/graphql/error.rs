//! Error types for the GraphQL client

use thiserror::Error;

use crate::auth::AuthError;

/// Errors that can occur when querying the data backend
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// Network or connection failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// Backend answered but reported errors for the query
    #[error("GraphQL errors: {}", .0.join("; "))]
    Query(Vec<String>),

    /// Response carried neither data nor errors
    #[error("GraphQL response contained no data")]
    MissingData,

    /// Could not obtain an access token
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Response body was not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for GraphqlError {
    fn from(err: reqwest::Error) -> Self {
        GraphqlError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GraphqlError {
    fn from(err: serde_json::Error) -> Self {
        GraphqlError::Serialization(err.to_string())
    }
}

impl From<AuthError> for GraphqlError {
    fn from(err: AuthError) -> Self {
        GraphqlError::Authentication(err.0)
    }
}
