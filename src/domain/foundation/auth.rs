//! Authentication types for the domain layer.
//!
//! An [`Actor`] is the caller identity every core operation receives. It is
//! populated by whichever `SessionValidator` adapter verified the bearer token;
//! the domain never sees provider-specific claims.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Role, UserId};

/// Authenticated caller: identity plus role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// The token carries a role this service does not know.
    #[error("Unknown role claim: {0}")]
    UnknownRole(String),

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::UnknownRole(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_reports_admin() {
        let admin = Actor::new(UserId::new("a1").unwrap(), Role::Admin);
        let student = Actor::new(UserId::new("s1").unwrap(), Role::Student);
        assert!(admin.is_admin());
        assert!(!student.is_admin());
    }

    #[test]
    fn service_unavailable_does_not_require_reauth() {
        assert!(!AuthError::service_unavailable("down").requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
    }
}
