//! HTTP routes for chat endpoints.

use axum::{routing::get, Router};

use super::handlers::{list_messages, post_message, ChatHandlers};

/// Creates the chat router: `GET` and `POST /:group_id/messages`.
pub fn chat_routes(handlers: ChatHandlers) -> Router {
    Router::new()
        .route("/:group_id/messages", get(list_messages).post(post_message))
        .with_state(handlers)
}
