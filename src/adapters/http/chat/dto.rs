//! HTTP DTOs for chat endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::chat::ChatPost;

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    #[serde(alias = "content")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub group_id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_role: Option<String>,
    pub text: String,
    pub timestamp: String,
}

impl From<ChatPost> for MessageResponse {
    fn from(post: ChatPost) -> Self {
        Self {
            id: post.id.to_string(),
            group_id: post.group_id.to_string(),
            sender_id: post.sender_id.to_string(),
            sender_role: post.sender_role.map(|role| role.to_string()),
            text: post.text,
            timestamp: post.timestamp.to_rfc3339(),
        }
    }
}
