// Route definitions

use std::convert::Infallible;

use warp::Filter;

use crate::handlers;
use crate::state::AppState;

/// Largest request body accepted, in bytes
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api").and(warp::path("v1"));

    // POST /api/v1/chat
    let chat = api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::chat_handler);

    // POST /api/v1/chat/stream
    let chat_stream = api
        .and(warp::path("chat"))
        .and(warp::path("stream"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(handlers::chat_stream_handler);

    // GET /healthz
    let health = warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "ok");

    // Combine routes
    chat.or(chat_stream).or(health)
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
