//! Complaint-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | GroupNotFound | 404 |
//! | UserNotFound | 404 |
//! | InvalidAddressing | 400 |
//! | Forbidden | 403 |
//! | ValidationFailed | 400 |
//! | Conflict | 409 |
//! | Infrastructure | 500 |

use crate::domain::authorization::DenyReason;
use crate::domain::foundation::{
    ComplaintId, DomainError, ErrorCode, GroupId, UserId, ValidationError,
};

/// Complaint-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplaintError {
    NotFound(ComplaintId),

    /// The addressed group does not exist.
    GroupNotFound(GroupId),

    /// The addressed user does not exist.
    UserNotFound(UserId),

    /// Neither or more than one target was supplied.
    InvalidAddressing(DenyReason),

    /// The authorization gate rejected the operation.
    Forbidden(DenyReason),

    ValidationFailed {
        field: String,
        message: String,
    },

    /// The read-by update kept conflicting with concurrent writers.
    Conflict(ComplaintId),

    Infrastructure(String),
}

impl ComplaintError {
    pub fn not_found(id: ComplaintId) -> Self {
        ComplaintError::NotFound(id)
    }

    pub fn group_not_found(id: GroupId) -> Self {
        ComplaintError::GroupNotFound(id)
    }

    pub fn user_not_found(id: UserId) -> Self {
        ComplaintError::UserNotFound(id)
    }

    /// Maps a gate denial, keeping addressing mistakes in the validation
    /// category.
    pub fn denied(reason: DenyReason) -> Self {
        if reason.is_addressing_error() {
            ComplaintError::InvalidAddressing(reason)
        } else {
            ComplaintError::Forbidden(reason)
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ComplaintError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(id: ComplaintId) -> Self {
        ComplaintError::Conflict(id)
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ComplaintError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ComplaintError::NotFound(_) => ErrorCode::ComplaintNotFound,
            ComplaintError::GroupNotFound(_) => ErrorCode::GroupNotFound,
            ComplaintError::UserNotFound(_) => ErrorCode::UserNotFound,
            ComplaintError::InvalidAddressing(_) => ErrorCode::InvalidAddressing,
            ComplaintError::Forbidden(_) => ErrorCode::Forbidden,
            ComplaintError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ComplaintError::Conflict(_) => ErrorCode::Conflict,
            ComplaintError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Deny reason carried by addressing and authorization failures.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            ComplaintError::InvalidAddressing(reason) | ComplaintError::Forbidden(reason) => {
                Some(*reason)
            }
            _ => None,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            ComplaintError::NotFound(id) => format!("Complaint not found: {}", id),
            ComplaintError::GroupNotFound(id) => format!("Group not found: {}", id),
            ComplaintError::UserNotFound(id) => format!("User not found: {}", id),
            ComplaintError::InvalidAddressing(reason) | ComplaintError::Forbidden(reason) => {
                reason.description().to_string()
            }
            ComplaintError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ComplaintError::Conflict(id) => {
                format!("Complaint {} was modified concurrently, try again", id)
            }
            ComplaintError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ComplaintError::Conflict(_) | ComplaintError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for ComplaintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ComplaintError {}

impl From<ValidationError> for ComplaintError {
    fn from(err: ValidationError) -> Self {
        ComplaintError::validation(err.field().to_string(), err.to_string())
    }
}

impl From<DomainError> for ComplaintError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => ComplaintError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => ComplaintError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ComplaintError> for DomainError {
    fn from(err: ComplaintError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err.deny_reason() {
            Some(reason) => domain.with_detail("reason", reason.code()),
            None => domain,
        }
    }
}
