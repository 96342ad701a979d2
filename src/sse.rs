use std::convert::Infallible;

use warp::sse::Event;

use crate::models::{Done, TextChunk};

/// Create a text SSE event carrying one fragment of the answer
pub fn create_text_event(id: &str, chunk: String) -> Result<Event, Infallible> {
    let payload = TextChunk {
        id: id.to_string(),
        chunk,
    };

    Ok(Event::default()
        .event("text")
        .data(serde_json::to_string(&payload).unwrap_or_default()))
}

/// Create a done SSE event to signal stream completion
pub fn create_done_event(id: &str) -> Result<Event, Infallible> {
    let payload = Done { id: id.to_string() };

    Ok(Event::default()
        .event("done")
        .data(serde_json::to_string(&payload).unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_text_event() {
        let event = create_text_event("req-1", "Hello world".to_string()).unwrap();
        let rendered = event.to_string();
        assert!(rendered.contains("event:text"));
        assert!(rendered.contains(r#"data:{"id":"req-1","chunk":"Hello world"}"#));
    }

    #[test]
    fn test_create_done_event() {
        let rendered = create_done_event("req-1").unwrap().to_string();
        assert!(rendered.contains("event:done"));
        assert!(rendered.contains(r#"data:{"id":"req-1"}"#));
    }

    #[test]
    fn test_multiline_chunk_stays_one_event() {
        let rendered = create_text_event("req-1", "line one\nline two".to_string())
            .unwrap()
            .to_string();
        // JSON escapes the newline, so there is a single data line
        assert_eq!(rendered.matches("data:").count(), 1);
    }
}
