//! Server-Sent Events (SSE) parser for Claude responses

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::ClaudeStreamEvent;

/// Parse a stream of bytes as Claude SSE events
///
/// Claude's SSE format uses:
/// ```text
/// event: message_start
/// data: {"type":"message_start",...}
///
/// event: content_block_delta
/// data: {"type":"content_block_delta",...}
/// ```
///
/// Bytes are buffered until a blank line closes an event. Chunks may split
/// events, lines and UTF-8 sequences anywhere.
pub fn parse_sse_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<ClaudeStreamEvent, LlmError>> + Send>> {
    let mut buffer: Vec<u8> = Vec::new();

    let event_stream = byte_stream.flat_map(move |chunk_result| {
        let chunk = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
            }
        };

        buffer.extend(chunk.iter().filter(|b| **b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_event_end(&buffer) {
            let raw: Vec<u8> = buffer.drain(..end + 2).collect();
            match std::str::from_utf8(&raw[..end]) {
                Ok(event_text) => {
                    if let Some(parsed) = parse_event(event_text) {
                        events.push(parsed);
                    }
                }
                Err(e) => events.push(Err(LlmError::StreamError(format!(
                    "Invalid UTF-8 in stream: {}",
                    e
                )))),
            }
        }

        futures::stream::iter(events)
    });

    Box::pin(event_stream)
}

/// Position of the first `\n\n` in the buffer
fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Parse a single SSE event from its text representation
fn parse_event(event_text: &str) -> Option<Result<ClaudeStreamEvent, LlmError>> {
    let mut event_type: Option<&str> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in event_text.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
        // Comments (":") and unknown fields are ignored
    }

    if data_lines.is_empty() {
        return None;
    }
    let data = data_lines.join("\n");
    if data.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<ClaudeStreamEvent>(&data) {
        Ok(event) => Some(Ok(event)),
        Err(e) => Some(Err(LlmError::SerializationError(format!(
            "Failed to parse Claude SSE event (type: {:?}): {}. Data: {}",
            event_type, e, data
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::claude::types::{ClaudeContentBlockStart, ClaudeContentDelta};
    use futures::stream;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>> {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    #[tokio::test]
    async fn test_parse_content_block_delta() {
        let data = b"event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![data]));

        match sse_stream.next().await.unwrap().unwrap() {
            ClaudeStreamEvent::ContentBlockDelta { index, delta } => {
                assert_eq!(index, 0);
                match delta {
                    ClaudeContentDelta::TextDelta { text } => assert_eq!(text, "Hello"),
                    _ => panic!("Expected text delta"),
                }
            }
            _ => panic!("Expected ContentBlockDelta event"),
        }
    }

    #[tokio::test]
    async fn test_parse_multiple_events_in_one_chunk() {
        let data = b"event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_123\",\"type\":\"message\",\"role\":\"assistant\",\"content\":[],\"model\":\"claude-haiku-4-5\",\"stop_reason\":null,\"stop_sequence\":null,\"usage\":{\"input_tokens\":10,\"output_tokens\":0}}}\n\nevent: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"tool_use\",\"id\":\"toolu_1\",\"name\":\"list_matches\",\"input\":{}}}\n\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![data]));

        match sse_stream.next().await.unwrap().unwrap() {
            ClaudeStreamEvent::MessageStart { message } => {
                assert_eq!(message.id, "msg_123");
                assert_eq!(message.usage.input_tokens, 10);
            }
            _ => panic!("Expected MessageStart event"),
        }
        match sse_stream.next().await.unwrap().unwrap() {
            ClaudeStreamEvent::ContentBlockStart { content_block, .. } => match content_block {
                ClaudeContentBlockStart::ToolUse { id, name } => {
                    assert_eq!(id, "toolu_1");
                    assert_eq!(name, "list_matches");
                }
                _ => panic!("Expected tool use block"),
            },
            _ => panic!("Expected ContentBlockStart event"),
        }
        assert!(sse_stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_chunked_event_with_crlf() {
        let chunk1: &'static [u8] = b"event: content_block_delta\r\ndata: {\"type\":\"content_block";
        let chunk2: &'static [u8] =
            b"_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Gol\"}}\r\n\r\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![chunk1, chunk2]));

        match sse_stream.next().await.unwrap().unwrap() {
            ClaudeStreamEvent::ContentBlockDelta {
                delta: ClaudeContentDelta::TextDelta { text },
                ..
            } => assert_eq!(text, "Gol"),
            _ => panic!("Expected text delta"),
        }
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_chunks() {
        // "é" is 0xC3 0xA9; split it between chunks
        let chunk1: &'static [u8] = b"data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Pel\xC3";
        let chunk2: &'static [u8] = b"\xA9\"}}\n\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![chunk1, chunk2]));

        match sse_stream.next().await.unwrap().unwrap() {
            ClaudeStreamEvent::ContentBlockDelta {
                delta: ClaudeContentDelta::TextDelta { text },
                ..
            } => assert_eq!(text, "Pelé"),
            _ => panic!("Expected text delta"),
        }
    }

    #[tokio::test]
    async fn test_parse_ping_and_error_events() {
        let data = b"event: ping\ndata: {\"type\":\"ping\"}\n\nevent: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![data]));

        assert!(matches!(
            sse_stream.next().await.unwrap().unwrap(),
            ClaudeStreamEvent::Ping
        ));
        match sse_stream.next().await.unwrap().unwrap() {
            ClaudeStreamEvent::Error { error } => {
                assert_eq!(error.error_type, "overloaded_error");
                assert_eq!(error.message, "Overloaded");
            }
            _ => panic!("Expected Error event"),
        }
    }

    #[tokio::test]
    async fn test_parse_invalid_json() {
        let data = b"event: message_delta\ndata: {invalid json}\n\n";
        let mut sse_stream = parse_sse_stream(byte_stream(vec![data]));

        assert!(sse_stream.next().await.unwrap().is_err());
    }
}
