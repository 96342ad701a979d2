#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use matchday::config::AgentSettings;
use matchday::graphql::{query_registry, GraphqlError, GraphqlTransport};
use matchday::llm::core::provider::EventStream;
use matchday::llm::{
    ContentBlock, FinishReason, GenerateRequest, LlmError, LlmProvider, StreamEvent,
    UsageMetadata,
};
use matchday::llm::core::types::{ContentBlockStart, ContentDelta, PartialToolUse};
use matchday::state::AppState;
use serde_json::Value;

/// One scripted model turn
pub enum Turn {
    Events(Vec<StreamEvent>),
    Fail(String),
    /// Never answers
    Stall,
}

/// Model stand-in that replays scripted turns and records every request
#[derive(Default)]
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Turn>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Turn>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.requests.lock().unwrap().push(request);

        let turn = self.turns.lock().unwrap().pop_front();
        match turn {
            Some(Turn::Stall) => futures::future::pending().await,
            Some(Turn::Events(events)) => Ok(Box::pin(futures::stream::iter(
                events.into_iter().map(Ok),
            ))),
            Some(Turn::Fail(message)) => Err(LlmError::HttpError {
                status: 503,
                body: message,
            }),
            None => Err(LlmError::StreamError("script exhausted".to_string())),
        }
    }
}

/// A turn that streams `fragments` as text and ends normally
pub fn text_turn(fragments: &[&str]) -> Turn {
    let mut events = vec![StreamEvent::ContentBlockStart {
        index: 0,
        block: ContentBlockStart::Text {
            text: String::new(),
        },
    }];
    for fragment in fragments {
        events.push(StreamEvent::ContentDelta {
            index: 0,
            delta: ContentDelta::TextDelta {
                text: fragment.to_string(),
            },
        });
    }
    events.push(StreamEvent::ContentBlockEnd { index: 0 });
    events.push(StreamEvent::MessageEnd {
        finish_reason: FinishReason::EndTurn,
        usage: UsageMetadata::new(20, 10),
    });
    Turn::Events(events)
}

/// A turn that optionally says something, then requests `calls` as (id, name, input)
pub fn tool_turn(preamble: Option<&str>, calls: &[(&str, &str, Value)]) -> Turn {
    let mut events = Vec::new();
    let mut index = 0;

    if let Some(text) = preamble {
        events.push(StreamEvent::ContentBlockStart {
            index,
            block: ContentBlockStart::Text {
                text: String::new(),
            },
        });
        events.push(StreamEvent::ContentDelta {
            index,
            delta: ContentDelta::TextDelta {
                text: text.to_string(),
            },
        });
        events.push(StreamEvent::ContentBlockEnd { index });
        index += 1;
    }

    for (id, name, input) in calls {
        events.push(StreamEvent::ContentBlockStart {
            index,
            block: ContentBlockStart::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
            },
        });
        events.push(StreamEvent::ContentDelta {
            index,
            delta: ContentDelta::ToolUseDelta {
                partial: PartialToolUse {
                    id: None,
                    name: None,
                    partial_json: input.to_string(),
                },
            },
        });
        events.push(StreamEvent::ContentBlockEnd { index });
        index += 1;
    }

    events.push(StreamEvent::MessageEnd {
        finish_reason: FinishReason::ToolUse,
        usage: UsageMetadata::new(20, 10),
    });
    Turn::Events(events)
}

/// GraphQL stand-in: answers with `data` or fails every call
pub struct MockTransport {
    data: Result<Value, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn returning(data: Value) -> Arc<Self> {
        Arc::new(Self {
            data: Ok(data),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            data: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GraphqlTransport for MockTransport {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, GraphqlError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), variables));
        match &self.data {
            Ok(data) => Ok(data.clone()),
            Err(message) => Err(GraphqlError::Transport(message.clone())),
        }
    }
}

/// Application state wired to the mocks
pub fn app_state(provider: Arc<ScriptedProvider>, transport: Arc<MockTransport>) -> AppState {
    app_state_with(provider, transport, AgentSettings::default())
}

/// Application state wired to the mocks with custom agent settings
pub fn app_state_with(
    provider: Arc<ScriptedProvider>,
    transport: Arc<MockTransport>,
    settings: AgentSettings,
) -> AppState {
    let tools = query_registry(transport).unwrap();
    AppState::new(provider, tools, settings)
}

/// Tool results carried by a user turn, as (tool_use_id, content, is_error)
pub fn tool_results(request: &GenerateRequest, message_index: usize) -> Vec<(String, String, bool)> {
    request.messages[message_index]
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some((tool_use_id.clone(), content.clone(), *is_error)),
            _ => None,
        })
        .collect()
}
