//! Mock session validator for tests and local development.
//!
//! # Example
//!
//! ```ignore
//! use groupdesk::adapters::auth::MockSessionValidator;
//! use groupdesk::domain::foundation::Role;
//!
//! let validator = MockSessionValidator::new()
//!     .with_actor("student-token", "U1", Role::Student)
//!     .with_actor("admin-token", "A1", Role::Admin);
//!
//! let actor = validator.validate("student-token").await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{Actor, AuthError, Role, UserId};
use crate::ports::SessionValidator;

/// Maps fixed tokens to actors. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default, Clone)]
pub struct MockSessionValidator {
    tokens: HashMap<String, Actor>,
    /// Returned for every validation when set.
    force_error: Option<AuthError>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as belonging to `user_id` with `role`.
    ///
    /// Blank user ids are ignored.
    pub fn with_actor(mut self, token: impl Into<String>, user_id: &str, role: Role) -> Self {
        if let Ok(id) = UserId::new(user_id) {
            self.tokens.insert(token.into(), Actor::new(id, role));
        }
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(mut self, error: AuthError) -> Self {
        self.force_error = Some(error);
        self
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<Actor, AuthError> {
        if let Some(error) = &self.force_error {
            return Err(error.clone());
        }
        self.tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}
