//! A single chat message.

use crate::domain::foundation::{Actor, GroupId, MessageId, Role, Timestamp, UserId, ValidationError};

/// Longest accepted message text, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// A message in a group chat.
///
/// # Invariants
///
/// - `text` is trimmed, non-blank and at most [`MAX_MESSAGE_LENGTH`] characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPost {
    pub id: MessageId,
    pub group_id: GroupId,
    pub sender_id: UserId,
    /// Missing on messages stored before roles were recorded.
    pub sender_role: Option<Role>,
    pub text: String,
    pub timestamp: Timestamp,
}

impl ChatPost {
    /// A new message from `sender`, stamped `now`.
    pub fn new(
        group_id: GroupId,
        sender: &Actor,
        text: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: MessageId::generate(),
            group_id,
            sender_id: sender.id.clone(),
            sender_role: Some(sender.role),
            text: validate_text(text.into())?,
            timestamp: now,
        })
    }
}

fn validate_text(text: String) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("text"));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::invalid_format(
            "text",
            format!("must be at most {} characters", MAX_MESSAGE_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}
