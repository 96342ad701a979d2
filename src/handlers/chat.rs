// POST /api/v1/chat handler

use std::time::Instant;

use uuid::Uuid;
use warp::http::StatusCode;
use warp::Reply;

use super::{empty_message_reply, error_reply};
use crate::models::ChatRequest;
use crate::state::AppState;

pub async fn chat_handler(
    request: ChatRequest,
    state: AppState,
) -> Result<Box<dyn Reply>, warp::Rejection> {
    let Some(message) = request.trimmed_message() else {
        return Ok(empty_message_reply());
    };

    let request_id = Uuid::new_v4();
    let started = Instant::now();
    tracing::info!(%request_id, chars = message.chars().count(), "POST /api/v1/chat");

    match state.agent().answer(message).await {
        Ok(answer) => {
            tracing::info!(
                %request_id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "chat completed"
            );
            Ok(Box::new(warp::reply::with_status(answer, StatusCode::OK)))
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "chat failed");
            Ok(error_reply(&e))
        }
    }
}
