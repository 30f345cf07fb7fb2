//! API error responses.
//!
//! | Category | Status |
//! |----------|--------|
//! | validation, invalid addressing, duplicate note | 400 |
//! | forbidden (with `reason`) | 403 |
//! | not found | 404 |
//! | conflict | 409 |
//! | infrastructure | 500 |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::authorization::DenyReason;
use crate::domain::chat::ChatError;
use crate::domain::complaint::ComplaintError;
use crate::domain::directory::DirectoryError;
use crate::domain::foundation::ErrorCode;
use crate::ports::StoreError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// An error on its way out as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code: code.into(),
                message: message.into(),
                reason: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed.to_string(), message)
    }

    pub fn forbidden(reason: DenyReason) -> Self {
        let mut err = Self::new(
            StatusCode::FORBIDDEN,
            ErrorCode::Forbidden.to_string(),
            reason.description(),
        );
        err.body.reason = Some(reason.code());
        err
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError.to_string(),
            message,
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }

    fn from_code(code: ErrorCode, message: String, reason: Option<DenyReason>) -> Self {
        let status = status_for(code);
        if status.is_server_error() {
            tracing::error!(code = %code, error = %message, "request failed");
        }
        let mut err = Self::new(status, code.to_string(), message);
        err.body.reason = reason.map(|r| r.code());
        err
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidAddressing | ErrorCode::DuplicateNote => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::UserNotFound
        | ErrorCode::GroupNotFound
        | ErrorCode::ComplaintNotFound
        | ErrorCode::NoteNotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ComplaintError> for ApiError {
    fn from(err: ComplaintError) -> Self {
        Self::from_code(err.code(), err.message(), err.deny_reason())
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self::from_code(err.code(), err.message(), err.deny_reason())
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        Self::from_code(err.code(), err.message(), err.deny_reason())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::from_code(ErrorCode::DatabaseError, err.to_string(), None)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ComplaintId, GroupId};

    #[test]
    fn forbidden_carries_reason_code() {
        let err = ApiError::from(ComplaintError::Forbidden(DenyReason::NoSharedGroup));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body().reason, Some("NO_SHARED_GROUP"));
        assert_eq!(err.body().code, "FORBIDDEN");
    }

    #[test]
    fn invalid_addressing_is_bad_request_with_reason() {
        let err = ApiError::from(ComplaintError::InvalidAddressing(DenyReason::AmbiguousTarget));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().reason, Some("AMBIGUOUS_TARGET"));
    }

    #[test]
    fn not_found_and_conflict_statuses() {
        let id = ComplaintId::new("C1").unwrap();
        assert_eq!(
            ApiError::from(ComplaintError::NotFound(id.clone())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ComplaintError::Conflict(id)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DirectoryError::GroupNotFound(GroupId::new("G1").unwrap())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn chat_denial_is_403_and_user_clash_is_409() {
        let err = ApiError::from(ChatError::Forbidden(DenyReason::NotMember));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.body().reason, Some("NOT_MEMBER"));
        assert_eq!(
            ApiError::from(DirectoryError::UserExists("a@b.org".to_string())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn infrastructure_is_500_without_reason() {
        let err = ApiError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body().reason, None);
    }
}
