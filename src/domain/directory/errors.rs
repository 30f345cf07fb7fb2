//! Directory-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | GroupNotFound | 404 |
//! | UserNotFound | 404 |
//! | NoteNotFound | 404 |
//! | DuplicateNote | 400 |
//! | AlreadyInGroup | 409 |
//! | UserExists | 409 |
//! | ConcurrentModification | 409 |
//! | Forbidden | 403 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use super::notes::{NoteError, NoteKey};
use crate::domain::authorization::DenyReason;
use crate::domain::foundation::{DomainError, ErrorCode, GroupId, UserId, ValidationError};

/// Errors raised by membership directory and group operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    GroupNotFound(GroupId),

    UserNotFound(UserId),

    NoteNotFound(NoteKey),

    /// A note with this key already exists in the group's log.
    DuplicateNote(NoteKey),

    /// The user is a member or supervisor of another live group.
    AlreadyInGroup { user_id: UserId, group_id: GroupId },

    /// A user with this id or email already exists.
    UserExists(String),

    /// Concurrent writers kept changing the group.
    ConcurrentModification(GroupId),

    /// The authorization gate rejected the operation.
    Forbidden(DenyReason),

    ValidationFailed {
        field: String,
        message: String,
    },

    Infrastructure(String),
}

impl DirectoryError {
    pub fn group_not_found(id: GroupId) -> Self {
        DirectoryError::GroupNotFound(id)
    }

    pub fn user_not_found(id: UserId) -> Self {
        DirectoryError::UserNotFound(id)
    }

    pub fn already_in_group(user_id: UserId, group_id: GroupId) -> Self {
        DirectoryError::AlreadyInGroup { user_id, group_id }
    }

    pub fn forbidden(reason: DenyReason) -> Self {
        DirectoryError::Forbidden(reason)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DirectoryError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        DirectoryError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DirectoryError::GroupNotFound(_) => ErrorCode::GroupNotFound,
            DirectoryError::UserNotFound(_) => ErrorCode::UserNotFound,
            DirectoryError::NoteNotFound(_) => ErrorCode::NoteNotFound,
            DirectoryError::DuplicateNote(_) => ErrorCode::DuplicateNote,
            DirectoryError::AlreadyInGroup { .. }
            | DirectoryError::UserExists(_)
            | DirectoryError::ConcurrentModification(_) => ErrorCode::Conflict,
            DirectoryError::Forbidden(_) => ErrorCode::Forbidden,
            DirectoryError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            DirectoryError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Deny reason, when the gate rejected the operation.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            DirectoryError::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            DirectoryError::GroupNotFound(id) => format!("Group not found: {}", id),
            DirectoryError::UserNotFound(id) => format!("User not found: {}", id),
            DirectoryError::NoteNotFound(key) => format!("No note with timestamp '{}'", key),
            DirectoryError::DuplicateNote(key) => {
                format!("A note with timestamp '{}' already exists", key)
            }
            DirectoryError::AlreadyInGroup { user_id, group_id } => {
                format!("User {} already belongs to group {}", user_id, group_id)
            }
            DirectoryError::UserExists(key) => format!("A user with '{}' already exists", key),
            DirectoryError::ConcurrentModification(id) => {
                format!("Group {} was modified concurrently, please retry", id)
            }
            DirectoryError::Forbidden(reason) => reason.description().to_string(),
            DirectoryError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            DirectoryError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for DirectoryError {}

impl From<ValidationError> for DirectoryError {
    fn from(err: ValidationError) -> Self {
        DirectoryError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<NoteError> for DirectoryError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::EmptyKey => DirectoryError::validation("timestamp", err.to_string()),
            NoteError::EmptyText => DirectoryError::validation("text", err.to_string()),
            NoteError::Duplicate(key) => DirectoryError::DuplicateNote(key),
            NoteError::NotFound(key) => DirectoryError::NoteNotFound(key),
        }
    }
}

impl From<DomainError> for DirectoryError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => DirectoryError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => DirectoryError::Infrastructure(err.to_string()),
        }
    }
}

impl From<DirectoryError> for DomainError {
    fn from(err: DirectoryError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err.deny_reason() {
            Some(reason) => domain.with_detail("reason", reason.code()),
            None => domain,
        }
    }
}
