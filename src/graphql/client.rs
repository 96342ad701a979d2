//! GraphQL over HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::GraphqlError;
use crate::auth::AuthenticationManager;

/// Executes one GraphQL operation and returns its `data` member
#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, GraphqlError>;
}

/// How requests to the backend are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphqlAuth {
    /// No credentials attached
    None,
    /// Bearer token from Application Default Credentials
    Adc,
}

/// `executeGraphql` endpoint of a Firebase Data Connect service
pub fn dataconnect_url(project_id: &str, location: &str, service_id: &str) -> String {
    format!(
        "https://firebasedataconnect.googleapis.com/v1beta/projects/{}/locations/{}/services/{}:executeGraphql",
        project_id, location, service_id
    )
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

impl GraphqlResponse {
    fn into_data(self) -> Result<Value, GraphqlError> {
        if !self.errors.is_empty() {
            return Err(GraphqlError::Query(
                self.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        match self.data {
            Some(Value::Null) | None => Err(GraphqlError::MissingData),
            Some(data) => Ok(data),
        }
    }
}

/// HTTP client for the data backend
pub struct GraphqlClient {
    http_client: Client,
    endpoint: String,
    auth_manager: Option<AuthenticationManager>,
}

impl GraphqlClient {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or ADC was requested
    /// and no credentials can be found.
    pub async fn new(endpoint: impl Into<String>, auth: GraphqlAuth) -> Result<Self, GraphqlError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let auth_manager = match auth {
            GraphqlAuth::Adc => Some(AuthenticationManager::new().await?),
            GraphqlAuth::None => None,
        };

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            auth_manager,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphqlTransport for GraphqlClient {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, GraphqlError> {
        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables });

        if let Some(auth) = &self.auth_manager {
            let token = auth.get_token().await?;
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "GraphQL backend returned an error status");
            return Err(GraphqlError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphqlResponse = serde_json::from_str(&body)?;
        parsed.into_data()
    }
}
