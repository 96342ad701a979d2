//! Provider trait for LLM implementations

use async_trait::async_trait;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use super::accumulator::ResponseAccumulator;
use super::error::LlmError;
use super::types::{GenerateRequest, GenerateResponse, StreamEvent};

/// Boxed stream of provider events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream generate content from the LLM
    ///
    /// This method sends a request to the LLM and returns a stream of events
    /// representing the incremental response.
    ///
    /// # Arguments
    /// * `request` - The generation request with messages, tools, and config
    ///
    /// # Returns
    /// A pinned boxed stream of `StreamEvent` results, or an error if the request fails
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError>;

    /// Generate a complete response in one call
    ///
    /// The default implementation drains `stream_generate`. Providers with a
    /// non-streaming endpoint override it.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let mut stream = self.stream_generate(request).await?;
        let mut accumulator = ResponseAccumulator::new();

        while let Some(event) = stream.next().await {
            let event = event?;
            accumulator.push(&event)?;
            if accumulator.is_finished() {
                break;
            }
        }

        accumulator.finish()
    }
}
