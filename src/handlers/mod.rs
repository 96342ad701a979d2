// Handlers module

pub mod chat;
pub mod chat_stream;

pub use chat::chat_handler;
pub use chat_stream::chat_stream_handler;

use warp::http::StatusCode;
use warp::Reply;

use crate::llm::agent::AgentError;
use crate::models::EMPTY_MESSAGE_REPLY;

/// Fixed reply for a missing or blank message
fn empty_message_reply() -> Box<dyn Reply> {
    Box::new(warp::reply::with_status(
        EMPTY_MESSAGE_REPLY.to_string(),
        StatusCode::OK,
    ))
}

/// Plain-text 500 describing what went wrong
fn error_reply(error: &AgentError) -> Box<dyn Reply> {
    Box::new(warp::reply::with_status(
        error.to_string(),
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
