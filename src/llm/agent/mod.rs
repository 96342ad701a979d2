//! Agent loop implementation
//!
//! The agent owns one conversation and alternates between two phases:
//! - ask the model for its next turn (buffered or streamed)
//! - run every tool call from that turn and append the results
//!
//! It stops as soon as a turn ends for any reason other than tool use.

mod error;

pub use error::AgentError;

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::future::join_all;
use futures::stream::Stream;
use futures::StreamExt;
use pin_utils::pin_mut;

use crate::llm::core::{
    accumulator::ResponseAccumulator,
    config::GenerationConfig,
    provider::LlmProvider,
    types::{
        ContentBlock, ContentBlockStart, ContentDelta, GenerateRequest, GenerateResponse, Message,
        StreamEvent, ToolCall, ToolDeclaration,
    },
};
use crate::llm::tools::executor::ToolExecutor;

/// Default cap on model calls per request
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Events emitted by the agent during execution
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Agent is calling the model (1-based)
    IterationStarted { iteration: usize },

    /// A fragment of model text, forwarded as soon as it arrives
    TextDelta(String),

    /// Agent is executing a tool call
    ToolExecutionStarted {
        tool_use_id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool execution completed successfully
    ToolExecutionCompleted {
        tool_use_id: String,
        name: String,
        result: String,
    },

    /// Tool execution failed; the error went back to the model
    ToolExecutionFailed {
        tool_use_id: String,
        name: String,
        error: String,
    },

    /// Agent loop completed; carries the text of the final turn
    Completed { text: String },
}

/// What to do after a model turn
enum Step {
    Dispatch(Vec<ToolCall>),
    Done(String),
}

/// Agent that manages one conversation and its tool execution
pub struct Agent {
    /// LLM provider
    provider: Arc<dyn LlmProvider>,

    /// Tool executor for handling function calls
    tool_executor: Arc<dyn ToolExecutor>,

    /// Tool declarations available to the LLM
    tool_declarations: Vec<ToolDeclaration>,

    /// Conversation history (kept in memory)
    messages: Vec<Message>,

    /// Generation configuration (temperature, max_tokens, etc.)
    config: GenerationConfig,

    /// System prompt (optional)
    system: Option<String>,

    /// Maximum number of model calls (default: 10)
    max_iterations: usize,

    /// Limit on the whole run
    timeout: Option<Duration>,
}

impl Agent {
    /// Create a new agent with default settings
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tool_executor: Arc<dyn ToolExecutor>,
        tool_declarations: Vec<ToolDeclaration>,
        config: GenerationConfig,
        system: Option<String>,
    ) -> Self {
        Self {
            provider,
            tool_executor,
            tool_declarations,
            messages: Vec::new(),
            config,
            system,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout: None,
        }
    }

    /// Set the maximum number of iterations (default: 10)
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Bound the total time of a run
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Conversation so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Run the loop with buffered model calls and return the final text
    pub async fn answer(mut self, user_message: impl Into<String>) -> Result<String, AgentError> {
        self.messages.push(Message::user(user_message));

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.answer_loop())
                .await
                .map_err(|_| AgentError::Timeout(limit))?,
            None => self.answer_loop().await,
        }
    }

    async fn answer_loop(&mut self) -> Result<String, AgentError> {
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                return Err(AgentError::MaxIterationsReached(self.max_iterations));
            }

            tracing::debug!(iteration, "calling model");
            let response = self.provider.generate(self.request()).await?;

            match self.step(response) {
                Step::Done(text) => return Ok(text),
                Step::Dispatch(calls) => {
                    let outcomes = self.dispatch(&calls).await;
                    self.record_results(&calls, outcomes);
                }
            }
        }
    }

    /// Process a user message through the agent loop, streaming events
    ///
    /// The returned stream emits:
    /// - `IterationStarted` before every model call
    /// - `TextDelta` for each text fragment, in arrival order
    /// - `ToolExecution*` events around each tool call
    /// - `Completed` once, as the last item of a successful run
    ///
    /// An `Err` item is always the last item.
    pub fn run(
        mut self,
        user_message: impl Into<String>,
    ) -> impl Stream<Item = Result<AgentEvent, AgentError>> + Send + 'static {
        self.messages.push(Message::user(user_message));
        self.timed_event_stream()
    }

    /// `event_stream` bounded by the run's timeout
    fn timed_event_stream(
        self,
    ) -> impl Stream<Item = Result<AgentEvent, AgentError>> + Send + 'static {
        let timeout = self.timeout;
        let events = self.event_stream();

        stream! {
            let deadline = timeout.map(|limit| tokio::time::Instant::now() + limit);
            pin_mut!(events);

            loop {
                let next = match (deadline, timeout) {
                    (Some(deadline), Some(limit)) => {
                        match tokio::time::timeout_at(deadline, events.next()).await {
                            Ok(next) => next,
                            Err(_) => {
                                tracing::warn!(?limit, "agent run timed out");
                                yield Err(AgentError::Timeout(limit));
                                return;
                            }
                        }
                    }
                    _ => events.next().await,
                };

                match next {
                    Some(Ok(event)) => yield Ok(event),
                    Some(Err(e)) => {
                        yield Err(e);
                        return;
                    }
                    None => return,
                }
            }
        }
    }

    fn event_stream(mut self) -> impl Stream<Item = Result<AgentEvent, AgentError>> + Send {
        stream! {
            let mut iteration = 0;

            loop {
                iteration += 1;

                if iteration > self.max_iterations {
                    yield Err(AgentError::MaxIterationsReached(self.max_iterations));
                    return;
                }

                yield Ok(AgentEvent::IterationStarted { iteration });

                let llm_stream = match self.provider.stream_generate(self.request()).await {
                    Ok(s) => s,
                    Err(e) => {
                        yield Err(AgentError::Llm(e));
                        return;
                    }
                };
                pin_mut!(llm_stream);

                let mut accumulator = ResponseAccumulator::new();

                while let Some(event_result) = llm_stream.next().await {
                    let event = match event_result {
                        Ok(e) => e,
                        Err(e) => {
                            yield Err(AgentError::Llm(e));
                            return;
                        }
                    };

                    if let Some(text) = text_fragment(&event) {
                        yield Ok(AgentEvent::TextDelta(text.to_string()));
                    }

                    if let Err(e) = accumulator.push(&event) {
                        yield Err(AgentError::Llm(e));
                        return;
                    }

                    if accumulator.is_finished() {
                        break;
                    }
                }

                if !accumulator.is_finished() {
                    yield Err(AgentError::UnexpectedStreamEnd);
                    return;
                }

                let response = match accumulator.finish() {
                    Ok(r) => r,
                    Err(e) => {
                        yield Err(AgentError::Llm(e));
                        return;
                    }
                };

                let calls = match self.step(response) {
                    Step::Done(text) => {
                        yield Ok(AgentEvent::Completed { text });
                        return;
                    }
                    Step::Dispatch(calls) => calls,
                };

                for call in &calls {
                    yield Ok(AgentEvent::ToolExecutionStarted {
                        tool_use_id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.input.clone(),
                    });
                }

                let outcomes = self.dispatch(&calls).await;

                for (call, outcome) in calls.iter().zip(&outcomes) {
                    yield Ok(match outcome {
                        Ok(result) => AgentEvent::ToolExecutionCompleted {
                            tool_use_id: call.id.clone(),
                            name: call.name.clone(),
                            result: result.clone(),
                        },
                        Err(error) => AgentEvent::ToolExecutionFailed {
                            tool_use_id: call.id.clone(),
                            name: call.name.clone(),
                            error: error.clone(),
                        },
                    });
                }

                self.record_results(&calls, outcomes);
            }
        }
    }

    fn request(&self) -> GenerateRequest {
        GenerateRequest {
            messages: self.messages.clone(),
            tools: Some(self.tool_declarations.clone()),
            config: self.config.clone(),
            system: self.system.clone(),
        }
    }

    /// Decide the next state from a finished model turn
    ///
    /// A tool-use turn is appended as received. A tool-use turn with no calls
    /// is not recorded, since no results turn would follow it, and the loop
    /// asks the model again.
    fn step(&mut self, response: GenerateResponse) -> Step {
        tracing::debug!(
            finish_reason = ?response.finish_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model turn finished"
        );

        if !response.wants_tools() {
            let text = response.message.text();
            self.messages.push(response.message);
            return Step::Done(text);
        }

        let calls = response.message.tool_calls();
        if calls.is_empty() {
            tracing::warn!("tool_use turn without tool calls, asking again");
        } else {
            self.messages.push(response.message);
        }
        Step::Dispatch(calls)
    }

    /// Run one batch of tool calls concurrently, results in request order
    async fn dispatch(&self, calls: &[ToolCall]) -> Vec<Result<String, String>> {
        join_all(calls.iter().map(|call| {
            tracing::debug!(tool_use_id = %call.id, tool = %call.name, "dispatching tool call");
            self.tool_executor
                .execute(call.id.clone(), call.name.clone(), call.input.clone())
        }))
        .await
    }

    /// Append one user turn answering every call of the batch
    fn record_results(&mut self, calls: &[ToolCall], outcomes: Vec<Result<String, String>>) {
        if calls.is_empty() {
            return;
        }

        let results = calls
            .iter()
            .zip(outcomes)
            .map(|(call, outcome)| match outcome {
                Ok(content) => ContentBlock::tool_success(&call.id, content),
                Err(error) => ContentBlock::tool_failure(&call.id, error),
            })
            .collect();

        self.messages.push(Message::tool_results(results));
    }
}

/// Text carried by a streaming event, if any
fn text_fragment(event: &StreamEvent) -> Option<&str> {
    match event {
        StreamEvent::ContentDelta {
            delta: ContentDelta::TextDelta { text },
            ..
        }
        | StreamEvent::ContentBlockStart {
            block: ContentBlockStart::Text { text },
            ..
        } if !text.is_empty() => Some(text.as_str()),
        _ => None,
    }
}
