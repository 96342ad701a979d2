// Request and event payloads for the HTTP API

use serde::{Deserialize, Serialize};

/// Reply sent instead of running the agent when there is nothing to answer
pub const EMPTY_MESSAGE_REPLY: &str = "Please enter a message.";

// Request Types
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// The message with surrounding whitespace removed, if anything is left
    pub fn trimmed_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

// SSE Event Types
#[derive(Debug, Clone, Serialize)]
pub struct TextChunk {
    pub id: String,
    pub chunk: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Done {
    pub id: String,
}
