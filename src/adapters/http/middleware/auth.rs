//! Bearer authentication for axum.
//!
//! `auth_middleware` resolves the `Authorization: Bearer <token>` header into
//! an [`Actor`] through the `SessionValidator` port and stores it in the
//! request extensions. Handlers take [`RequireAuth`] to get the caller; a
//! request without a valid token never reaches them.
//!
//! ```text
//! Request → auth_middleware → Actor in extensions → RequireAuth(actor)
//! ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{Actor, AuthError};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates the bearer token, if any, and injects the caller.
///
/// Requests without a token pass through unauthenticated; an invalid token
/// is rejected here with 401.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::UnknownRole(_) => (StatusCode::UNAUTHORIZED, "Unknown role"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!(error = %msg, "auth service unavailable");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Authentication service unavailable",
                    )
                }
            };
            (
                status,
                Json(serde_json::json!({
                    "code": "UNAUTHORIZED",
                    "message": message,
                })),
            )
                .into_response()
        }
    }
}

/// Extractor for the authenticated caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid bearer token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "code": "UNAUTHORIZED",
                    "message": "Authentication required",
                })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Role, UserId};

    fn actor() -> Actor {
        Actor::new(UserId::new("U1").unwrap(), Role::Student)
    }

    #[tokio::test]
    async fn require_auth_reads_actor_from_extensions() {
        let mut request: axum::http::Request<()> =
            axum::http::Request::builder().uri("/x").body(()).unwrap();
        request.extensions_mut().insert(actor());
        let (mut parts, _) = request.into_parts();

        let RequireAuth(found) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, actor());
    }

    #[tokio::test]
    async fn require_auth_rejects_missing_actor() {
        let request: axum::http::Request<()> =
            axum::http::Request::builder().uri("/x").body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[test]
    fn bearer_token_requires_prefix() {
        let with = axum::http::Request::builder()
            .header("Authorization", "Bearer abc")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&with), Some("abc"));

        let basic = axum::http::Request::builder()
            .header("Authorization", "Basic dXNlcg==")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&basic), None);
    }

    #[test]
    fn rejection_is_401() {
        assert_eq!(
            AuthRejection::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
