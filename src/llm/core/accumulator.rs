//! Folds a stream of `StreamEvent`s into a complete `GenerateResponse`

use std::collections::BTreeMap;

use super::error::LlmError;
use super::types::{
    ContentBlock, ContentBlockStart, ContentDelta, FinishReason, GenerateResponse, Message,
    MessageRole, StreamEvent, UsageMetadata,
};

/// Block under construction, keyed by its stream index
enum PartialBlock {
    Text(String),
    ToolUse {
        id: String,
        name: String,
        input: String,
    },
}

/// Accumulates streamed content blocks until `MessageEnd`
#[derive(Default)]
pub struct ResponseAccumulator {
    blocks: BTreeMap<usize, PartialBlock>,
    finish_reason: Option<FinishReason>,
    usage: UsageMetadata,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event
    ///
    /// Provider `Error` events are returned as `LlmError::ProviderError`.
    pub fn push(&mut self, event: &StreamEvent) -> Result<(), LlmError> {
        match event {
            StreamEvent::ContentBlockStart { index, block } => {
                let partial = match block {
                    ContentBlockStart::Text { text } => PartialBlock::Text(text.clone()),
                    ContentBlockStart::ToolUse { id, name } => PartialBlock::ToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input: String::new(),
                    },
                };
                self.blocks.insert(*index, partial);
            }
            StreamEvent::ContentDelta { index, delta } => {
                // A text delta may arrive without a preceding block start
                let block = self
                    .blocks
                    .entry(*index)
                    .or_insert_with(|| PartialBlock::Text(String::new()));
                match (block, delta) {
                    (PartialBlock::Text(text), ContentDelta::TextDelta { text: more }) => {
                        text.push_str(more);
                    }
                    (PartialBlock::ToolUse { input, .. }, ContentDelta::ToolUseDelta { partial }) => {
                        input.push_str(&partial.partial_json);
                    }
                    _ => {
                        return Err(LlmError::StreamError(format!(
                            "Delta does not match content block {}",
                            index
                        )))
                    }
                }
            }
            StreamEvent::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.usage = usage;
                }
            }
            StreamEvent::MessageDelta { usage } => {
                if let Some(usage) = usage {
                    self.usage = *usage;
                }
            }
            StreamEvent::MessageEnd {
                finish_reason,
                usage,
            } => {
                self.finish_reason = Some(finish_reason.clone());
                self.usage = *usage;
            }
            StreamEvent::Error { error } => {
                return Err(LlmError::ProviderError {
                    code: "stream_error".to_string(),
                    message: error.clone(),
                });
            }
            StreamEvent::ContentBlockEnd { .. } => {}
        }
        Ok(())
    }

    /// Whether `MessageEnd` has been seen
    pub fn is_finished(&self) -> bool {
        self.finish_reason.is_some()
    }

    /// Build the final response
    ///
    /// Tool inputs are parsed here; a tool with no arguments streams an empty
    /// input, which becomes `{}`. Invalid input is an error only on a
    /// `ToolUse` stop. Any other stop drops the cut-off call and keeps the text.
    pub fn finish(self) -> Result<GenerateResponse, LlmError> {
        let finish_reason = self.finish_reason.ok_or_else(|| {
            LlmError::StreamError("Stream ended before the message completed".to_string())
        })?;

        let mut content = Vec::with_capacity(self.blocks.len());
        for block in self.blocks.into_values() {
            match block {
                PartialBlock::Text(text) => {
                    if !text.is_empty() {
                        content.push(ContentBlock::Text { text });
                    }
                }
                PartialBlock::ToolUse { id, name, input } => {
                    let input = if input.trim().is_empty() {
                        serde_json::json!({})
                    } else {
                        match serde_json::from_str(&input) {
                            Ok(input) => input,
                            Err(e) if finish_reason == FinishReason::ToolUse => return Err(e.into()),
                            Err(e) => {
                                tracing::warn!(
                                    tool_use_id = %id,
                                    tool = %name,
                                    ?finish_reason,
                                    error = %e,
                                    "dropping incomplete tool call"
                                );
                                continue;
                            }
                        }
                    };
                    content.push(ContentBlock::ToolUse { id, name, input });
                }
            }
        }

        Ok(GenerateResponse {
            message: Message {
                role: MessageRole::Assistant,
                content,
            },
            finish_reason,
            usage: self.usage,
        })
    }
}
