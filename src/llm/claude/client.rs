//! Claude client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use std::str::FromStr;
use std::time::Duration;

use crate::auth::AuthenticationManager;
use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{GenerateRequest, GenerateResponse, StreamEvent, UsageMetadata},
};

use super::mapper::{from_claude_event, from_claude_response, to_claude_request};
use super::sse::parse_sse_stream;
use super::types::{ClaudeErrorResponse, ClaudeResponse, MessagesRequest};

const VERTEX_ANTHROPIC_VERSION: &str = "vertex-2023-10-16";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Claude model identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaudeModel {
    /// Claude Sonnet 4.5 (released 2025-09-29)
    Sonnet45,
    /// Claude Haiku 4.5 (released 2025-10-01)
    Haiku45,
}

impl ClaudeModel {
    /// Model identifier on Vertex AI
    pub fn vertex_id(&self) -> &str {
        match self {
            ClaudeModel::Sonnet45 => "claude-sonnet-4-5@20250929",
            ClaudeModel::Haiku45 => "claude-haiku-4-5@20251001",
        }
    }

    /// Model identifier on the Anthropic API
    pub fn anthropic_id(&self) -> &str {
        match self {
            ClaudeModel::Sonnet45 => "claude-sonnet-4-5-20250929",
            ClaudeModel::Haiku45 => "claude-haiku-4-5-20251001",
        }
    }
}

impl FromStr for ClaudeModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sonnet-4-5" | "sonnet45" | "sonnet" => Ok(ClaudeModel::Sonnet45),
            "haiku-4-5" | "haiku45" | "haiku" => Ok(ClaudeModel::Haiku45),
            other => Err(format!("unknown Claude model '{}'", other)),
        }
    }
}

/// Where Claude is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaudeEndpoint {
    /// Vertex AI, authenticated with Application Default Credentials
    Vertex { project_id: String, location: String },
    /// Anthropic API, authenticated with an API key
    Anthropic { api_key: String },
}

/// Client for the Claude Messages API
pub struct ClaudeClient {
    http_client: Client,
    /// Present only for the Vertex endpoint
    auth_manager: Option<AuthenticationManager>,
    endpoint: ClaudeEndpoint,
    model: ClaudeModel,
}

impl ClaudeClient {
    /// Create a new Claude client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or, for Vertex,
    /// if Application Default Credentials cannot be found.
    pub async fn new(endpoint: ClaudeEndpoint, model: ClaudeModel) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        let auth_manager = match endpoint {
            ClaudeEndpoint::Vertex { .. } => Some(AuthenticationManager::new().await?),
            ClaudeEndpoint::Anthropic { .. } => None,
        };

        Ok(Self {
            http_client,
            auth_manager,
            endpoint,
            model,
        })
    }

    /// Build the endpoint URL
    fn build_endpoint_url(&self, stream: bool) -> String {
        match &self.endpoint {
            ClaudeEndpoint::Vertex {
                project_id,
                location,
            } => vertex_url(project_id, location, &self.model, stream),
            ClaudeEndpoint::Anthropic { .. } => ANTHROPIC_MESSAGES_URL.to_string(),
        }
    }

    /// Fill in the endpoint-specific body fields
    fn prepare_body(&self, mut body: MessagesRequest) -> MessagesRequest {
        match self.endpoint {
            ClaudeEndpoint::Vertex { .. } => {
                body.anthropic_version = Some(VERTEX_ANTHROPIC_VERSION.to_string());
            }
            ClaudeEndpoint::Anthropic { .. } => {
                body.model = Some(self.model.anthropic_id().to_string());
            }
        }
        body
    }

    /// Attach authentication headers
    async fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, LlmError> {
        match (&self.endpoint, &self.auth_manager) {
            (ClaudeEndpoint::Anthropic { api_key }, _) => Ok(builder
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_API_VERSION)),
            (ClaudeEndpoint::Vertex { .. }, Some(auth)) => {
                let token = auth.get_token().await?;
                Ok(builder.header("Authorization", format!("Bearer {}", token)))
            }
            (ClaudeEndpoint::Vertex { .. }, None) => Err(LlmError::AuthenticationError(
                "Vertex endpoint without credentials".to_string(),
            )),
        }
    }

    /// Send a request and check the status
    async fn send(&self, request: GenerateRequest, stream: bool) -> Result<Response, LlmError> {
        let body = self.prepare_body(to_claude_request(request, stream));
        let url = self.build_endpoint_url(stream);

        let builder = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let response = self.authorize(builder).await?.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), body));
        }

        Ok(response)
    }
}

fn vertex_url(project_id: &str, location: &str, model: &ClaudeModel, stream: bool) -> String {
    let method = if stream {
        "streamRawPredict"
    } else {
        "rawPredict"
    };
    format!(
        "https://{}-aiplatform.googleapis.com/v1/projects/{}/locations/{}/publishers/anthropic/models/{}:{}",
        location,
        project_id,
        location,
        model.vertex_id(),
        method
    )
}

/// Map an error response, preferring the structured Claude error body
fn error_from_body(status: u16, body: String) -> LlmError {
    match serde_json::from_str::<ClaudeErrorResponse>(&body) {
        Ok(parsed) => LlmError::ProviderError {
            code: parsed.error.error_type,
            message: parsed.error.message,
        },
        Err(_) => LlmError::HttpError { status, body },
    }
}

#[async_trait]
impl LlmProvider for ClaudeClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        let response = self.send(request, true).await?;

        let sse_stream = parse_sse_stream(Box::pin(response.bytes_stream()));
        let mut accumulated_usage = UsageMetadata::default();

        let event_stream = sse_stream.flat_map(move |result| {
            let events: Vec<Result<StreamEvent, LlmError>> = match result {
                Ok(claude_event) => from_claude_event(claude_event, &mut accumulated_usage)
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Err(e) => vec![Err(e)],
            };
            futures::stream::iter(events)
        });

        Ok(Box::pin(event_stream))
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let response = self.send(request, false).await?;
        let claude_response: ClaudeResponse = response.json().await?;
        Ok(from_claude_response(claude_response))
    }
}
