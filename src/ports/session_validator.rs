//! Session validation port.
//!
//! Validates bearer tokens and resolves the caller's identity and role. The
//! HTTP middleware depends on this port; implementations exist for HS256 JWTs
//! and for tests.

use async_trait::async_trait;

use crate::domain::foundation::{Actor, AuthError};

/// Validates access tokens and extracts the caller.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature and expiry
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::UnknownRole` when the role claim is not recognised
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<Actor, AuthError>;
}
