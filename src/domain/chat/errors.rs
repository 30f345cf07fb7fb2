//! Chat-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | GroupNotFound | 404 |
//! | Forbidden | 403 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::authorization::DenyReason;
use crate::domain::foundation::{ErrorCode, GroupId, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    GroupNotFound(GroupId),

    /// The authorization gate rejected the operation.
    Forbidden(DenyReason),

    ValidationFailed {
        field: String,
        message: String,
    },

    Infrastructure(String),
}

impl ChatError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ChatError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ChatError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::GroupNotFound(_) => ErrorCode::GroupNotFound,
            ChatError::Forbidden(_) => ErrorCode::Forbidden,
            ChatError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ChatError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            ChatError::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ChatError::GroupNotFound(id) => format!("Group not found: {}", id),
            ChatError::Forbidden(reason) => reason.description().to_string(),
            ChatError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ChatError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ChatError {}

impl From<ValidationError> for ChatError {
    fn from(err: ValidationError) -> Self {
        ChatError::validation(err.field().to_string(), err.to_string())
    }
}
