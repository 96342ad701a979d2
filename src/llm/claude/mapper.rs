//! Mapping between abstraction types and Claude-specific types

use crate::llm::core::types::{
    ContentBlock, ContentBlockStart, ContentDelta, FinishReason, GenerateRequest,
    GenerateResponse, Message, MessageMetadata, MessageRole, PartialToolUse, StreamEvent,
    ToolDeclaration, UsageMetadata,
};

use super::types::{
    ClaudeContent, ClaudeContentBlock, ClaudeContentBlockStart, ClaudeContentDelta,
    ClaudeMessage, ClaudeResponse, ClaudeStreamEvent, ClaudeTool, MessagesRequest,
};

/// Convert our abstraction request to Claude's request format
///
/// `model` and `anthropic_version` are left unset; the client fills in
/// whichever its endpoint expects in the body.
pub fn to_claude_request(request: GenerateRequest, stream: bool) -> MessagesRequest {
    MessagesRequest {
        model: None,
        anthropic_version: None,
        max_tokens: request.config.max_tokens,
        messages: request
            .messages
            .into_iter()
            .map(to_claude_message)
            .collect(),
        system: request.system,
        tools: request
            .tools
            .filter(|tools| !tools.is_empty())
            .map(|tools| tools.into_iter().map(to_claude_tool).collect()),
        temperature: request.config.temperature,
        stream,
    }
}

fn to_claude_message(message: Message) -> ClaudeMessage {
    let role = match message.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
    .to_string();

    // A lone text block goes out as plain string content
    if let [ContentBlock::Text { text }] = message.content.as_slice() {
        return ClaudeMessage {
            role,
            content: ClaudeContent::Text(text.clone()),
        };
    }

    ClaudeMessage {
        role,
        content: ClaudeContent::Blocks(
            message
                .content
                .into_iter()
                .map(to_claude_content_block)
                .collect(),
        ),
    }
}

fn to_claude_content_block(block: ContentBlock) -> ClaudeContentBlock {
    match block {
        ContentBlock::Text { text } => ClaudeContentBlock::Text { text },
        ContentBlock::ToolUse { id, name, input } => ClaudeContentBlock::ToolUse { id, name, input },
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ClaudeContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error: is_error.then_some(true),
        },
    }
}

fn to_claude_tool(tool: ToolDeclaration) -> ClaudeTool {
    ClaudeTool {
        name: tool.name,
        description: tool.description,
        input_schema: tool.input_schema,
    }
}

/// Convert a complete (non-streamed) Claude response
pub fn from_claude_response(response: ClaudeResponse) -> GenerateResponse {
    let content = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ClaudeContentBlock::Text { text } => Some(ContentBlock::Text { text }),
            ClaudeContentBlock::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse { id, name, input })
            }
            // Never produced by the model
            ClaudeContentBlock::ToolResult { .. } => None,
        })
        .collect();

    let finish_reason = response
        .stop_reason
        .as_deref()
        .map(FinishReason::from_stop_reason)
        .unwrap_or(FinishReason::EndTurn);

    GenerateResponse {
        message: Message {
            role: MessageRole::Assistant,
            content,
        },
        finish_reason,
        usage: UsageMetadata::new(response.usage.input_tokens, response.usage.output_tokens),
    }
}

/// Convert Claude's stream event to our abstraction's StreamEvent
///
/// Returns a vector because `message_stop` and `ping` map to nothing.
pub fn from_claude_event(
    event: ClaudeStreamEvent,
    accumulated_usage: &mut UsageMetadata,
) -> Vec<StreamEvent> {
    match event {
        ClaudeStreamEvent::MessageStart { message } => {
            *accumulated_usage =
                UsageMetadata::new(message.usage.input_tokens, message.usage.output_tokens);

            vec![StreamEvent::MessageStart {
                message: MessageMetadata {
                    id: message.id,
                    role: MessageRole::Assistant,
                    usage: Some(*accumulated_usage),
                },
            }]
        }
        ClaudeStreamEvent::ContentBlockStart {
            index,
            content_block,
        } => {
            let block = match content_block {
                ClaudeContentBlockStart::Text { text } => ContentBlockStart::Text { text },
                ClaudeContentBlockStart::ToolUse { id, name } => {
                    ContentBlockStart::ToolUse { id, name }
                }
            };

            vec![StreamEvent::ContentBlockStart { index, block }]
        }
        ClaudeStreamEvent::ContentBlockDelta { index, delta } => {
            let delta = match delta {
                ClaudeContentDelta::TextDelta { text } => ContentDelta::TextDelta { text },
                ClaudeContentDelta::InputJsonDelta { partial_json } => ContentDelta::ToolUseDelta {
                    partial: PartialToolUse {
                        id: None,
                        name: None,
                        partial_json,
                    },
                },
            };

            vec![StreamEvent::ContentDelta { index, delta }]
        }
        ClaudeStreamEvent::ContentBlockStop { index } => {
            vec![StreamEvent::ContentBlockEnd { index }]
        }
        ClaudeStreamEvent::MessageDelta { delta, usage } => {
            if let Some(usage) = usage {
                *accumulated_usage =
                    UsageMetadata::new(accumulated_usage.input_tokens, usage.output_tokens);
            }

            match delta.stop_reason {
                Some(stop_reason) => vec![StreamEvent::MessageEnd {
                    finish_reason: FinishReason::from_stop_reason(&stop_reason),
                    usage: *accumulated_usage,
                }],
                None => vec![StreamEvent::MessageDelta {
                    usage: Some(*accumulated_usage),
                }],
            }
        }
        ClaudeStreamEvent::MessageStop | ClaudeStreamEvent::Ping => vec![],
        ClaudeStreamEvent::Error { error } => {
            vec![StreamEvent::Error {
                error: format!("{}: {}", error.error_type, error.message),
            }]
        }
    }
}
