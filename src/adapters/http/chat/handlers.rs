//! HTTP handlers for chat endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::{ListMessagesHandler, PostMessageCommand, PostMessageHandler};
use crate::domain::foundation::GroupId;
use crate::ports::DocumentStore;

use super::dto::{MessageResponse, PostMessageRequest};

#[derive(Clone)]
pub struct ChatHandlers {
    list_handler: Arc<ListMessagesHandler>,
    post_handler: Arc<PostMessageHandler>,
}

impl ChatHandlers {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            list_handler: Arc::new(ListMessagesHandler::new(store.clone())),
            post_handler: Arc::new(PostMessageHandler::new(store)),
        }
    }
}

fn group_id(raw: String) -> Result<GroupId, ApiError> {
    GroupId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET /api/chat/:group_id/messages - The group's chat, oldest first
pub async fn list_messages(
    State(handlers): State<ChatHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = handlers.list_handler.handle(&actor, &group_id(id)?).await?;
    let response: Vec<MessageResponse> = posts.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// POST /api/chat/:group_id/messages - Post as a member of the group
pub async fn post_message(
    State(handlers): State<ChatHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = PostMessageCommand {
        group_id: group_id(id)?,
        text: req.text,
    };
    let post = handlers.post_handler.handle(&actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::from(post))))
}
