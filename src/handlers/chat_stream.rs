// POST /api/v1/chat/stream handler

use std::convert::Infallible;

use async_stream::stream;
use futures::{Stream, StreamExt};
use pin_utils::pin_mut;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;
use warp::sse::Event;
use warp::Reply;

use super::{empty_message_reply, error_reply};
use crate::llm::agent::AgentEvent;
use crate::models::ChatRequest;
use crate::sse::{create_done_event, create_text_event};
use crate::state::AppState;

pub async fn chat_stream_handler(
    request: ChatRequest,
    state: AppState,
) -> Result<Box<dyn Reply>, warp::Rejection> {
    let Some(message) = request.trimmed_message() else {
        return Ok(empty_message_reply());
    };

    let request_id = Uuid::new_v4().to_string();
    tracing::info!(%request_id, chars = message.chars().count(), "POST /api/v1/chat/stream");

    let mut events = Box::pin(state.agent().run(message));

    // Hold the response until there is something to send, so a failure
    // before the first fragment still becomes a 500.
    let first = loop {
        match events.next().await {
            Some(Ok(event @ (AgentEvent::TextDelta(_) | AgentEvent::Completed { .. }))) => {
                break Some(event)
            }
            Some(Ok(progress)) => log_progress(&request_id, &progress),
            Some(Err(e)) => {
                tracing::error!(%request_id, error = %e, "chat stream failed before first chunk");
                return Ok(error_reply(&e));
            }
            None => break None,
        }
    };

    // The agent stream is Send but not Sync, so a task drives it and the
    // response reads from a channel.
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let body = sse_body(request_id.clone(), first, events);
        pin_mut!(body);

        while let Some(event) = body.next().await {
            if tx.send(event).is_err() {
                tracing::info!(%request_id, "client disconnected");
                return;
            }
        }
    });

    let body = UnboundedReceiverStream::new(rx);
    let reply = warp::sse::reply(warp::sse::keep_alive().stream(body));

    Ok(Box::new(warp::reply::with_header(
        reply,
        "X-Content-Type-Options",
        "nosniff",
    )))
}

/// Relay text fragments as SSE events, ending with `done`
fn sse_body<S, E>(
    request_id: String,
    first: Option<AgentEvent>,
    mut events: S,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<AgentEvent, E>> + Unpin + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    stream! {
        let mut pending = first;

        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => match events.next().await {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => {
                        // Headers are gone; all that is left is to stop
                        tracing::error!(%request_id, error = %e, "chat stream aborted");
                        return;
                    }
                    None => return,
                },
            };

            match event {
                AgentEvent::TextDelta(chunk) => yield create_text_event(&request_id, chunk),
                AgentEvent::Completed { .. } => {
                    tracing::info!(%request_id, "chat stream completed");
                    yield create_done_event(&request_id);
                    return;
                }
                progress => log_progress(&request_id, &progress),
            }
        }
    }
}

fn log_progress(request_id: &str, event: &AgentEvent) {
    match event {
        AgentEvent::IterationStarted { iteration } => {
            tracing::debug!(%request_id, iteration, "model call")
        }
        AgentEvent::ToolExecutionStarted { name, .. } => {
            tracing::debug!(%request_id, tool = %name, "tool started")
        }
        AgentEvent::ToolExecutionCompleted { name, .. } => {
            tracing::debug!(%request_id, tool = %name, "tool completed")
        }
        AgentEvent::ToolExecutionFailed { name, error, .. } => {
            tracing::warn!(%request_id, tool = %name, %error, "tool failed")
        }
        AgentEvent::TextDelta(_) | AgentEvent::Completed { .. } => {}
    }
}
