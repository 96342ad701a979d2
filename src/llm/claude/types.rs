//! Claude Messages API request and response types
//!
//! The same body shape is accepted by Vertex AI (`rawPredict` /
//! `streamRawPredict`) and by the Anthropic API; only `model` and
//! `anthropic_version` move between body, URL and headers.

use serde::{Deserialize, Serialize};

/// Request body for the Messages API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Model id; Anthropic API only (Vertex puts it in the URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API version; Vertex only (Anthropic takes it as a header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_version: Option<String>,
    /// Maximum number of tokens to generate (required)
    pub max_tokens: u32,
    /// Array of messages in the conversation
    pub messages: Vec<ClaudeMessage>,
    /// System prompt (top-level field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Available tools for the model to use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ClaudeTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

/// A single message in the Claude conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Content (can be string or array of content blocks)
    pub content: ClaudeContent,
}

/// Content can be either a simple string or an array of content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaudeContent {
    Text(String),
    Blocks(Vec<ClaudeContentBlock>),
}

/// A content block within a Claude message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentBlock {
    Text {
        text: String,
    },
    /// Model invoking a tool
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Application providing a tool result
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Tool definition for Claude
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeTool {
    pub name: String,
    pub description: String,
    /// Input schema (JSON Schema)
    pub input_schema: serde_json::Value,
}

/// Complete response of a non-streaming call
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeResponse {
    pub id: String,
    #[serde(default)]
    pub content: Vec<ClaudeContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: ClaudeUsage,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeErrorResponse {
    pub error: ClaudeErrorData,
}

/// SSE event types from Claude streaming API
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeStreamEvent {
    MessageStart {
        message: ClaudeMessageData,
    },
    ContentBlockStart {
        index: usize,
        content_block: ClaudeContentBlockStart,
    },
    ContentBlockDelta {
        index: usize,
        delta: ClaudeContentDelta,
    },
    ContentBlockStop {
        index: usize,
    },
    /// Carries the stop reason once the message completes
    MessageDelta {
        delta: ClaudeMessageDeltaData,
        usage: Option<ClaudeUsage>,
    },
    MessageStop,
    /// Keep-alive
    Ping,
    Error {
        error: ClaudeErrorData,
    },
}

/// Message data from message_start event
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessageData {
    pub id: String,
    pub role: String,
    pub model: String,
    pub usage: ClaudeUsage,
}

/// Content block start data
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentBlockStart {
    Text { text: String },
    ToolUse { id: String, name: String },
}

/// Content delta (incremental update)
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaudeContentDelta {
    TextDelta { text: String },
    /// Fragment of the tool input JSON
    InputJsonDelta { partial_json: String },
}

/// Message delta data
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeMessageDeltaData {
    pub stop_reason: Option<String>,
}

/// Usage metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeUsage {
    /// Not present in message_delta updates
    #[serde(default)]
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeErrorData {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_request_serialization() {
        let request = MessagesRequest {
            model: None,
            anthropic_version: Some("vertex-2023-10-16".to_string()),
            max_tokens: 1024,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: ClaudeContent::Text("list all matches".to_string()),
            }],
            system: Some("You answer questions about matches".to_string()),
            tools: None,
            temperature: None,
            stream: true,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"anthropic_version\":\"vertex-2023-10-16\""));
        assert!(json.contains("\"stream\":true"));
        assert!(!json.contains("\"model\""));
        assert!(!json.contains("\"tools\""));
    }

    #[test]
    fn test_tool_result_block_serialization() {
        let block = ClaudeContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "{\"error\":\"Unknown tool: x\"}".to_string(),
            is_error: Some(true),
        };

        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"tool_result\""));
        assert!(json.contains("\"is_error\":true"));
    }

    #[test]
    fn test_buffered_response_deserialization() {
        let json = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-haiku-4-5",
            "content": [
                {"type": "text", "text": "Let me look that up."},
                {"type": "tool_use", "id": "toolu_1", "name": "get_match", "input": {"id": "m-1"}}
            ],
            "stop_reason": "tool_use",
            "stop_sequence": null,
            "usage": {"input_tokens": 30, "output_tokens": 12}
        }"#;

        let response: ClaudeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content.len(), 2);
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    }

    #[test]
    fn test_content_block_delta_input_json() {
        let json = r#"{"type":"input_json_delta","partial_json":"{\"id\":"}"#;
        let delta: ClaudeContentDelta = serde_json::from_str(json).unwrap();

        match delta {
            ClaudeContentDelta::InputJsonDelta { partial_json } => {
                assert_eq!(partial_json, r#"{"id":"#);
            }
            _ => panic!("Expected InputJsonDelta"),
        }
    }
}
