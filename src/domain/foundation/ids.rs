//! Strongly-typed identifier value objects.
//!
//! Identifiers are opaque strings assigned by the document store or the
//! identity provider, so they wrap `String` rather than `Uuid`. Identifiers
//! minted by the service itself are UUID v4 strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning error if empty or blank.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// User identifier (issued by the identity provider).
    UserId,
    "user_id"
);

string_id!(
    /// Identifier of a supervisor/student group.
    GroupId,
    "group_id"
);

string_id!(
    /// Identifier of a complaint record.
    ComplaintId,
    "complaint_id"
);

string_id!(
    /// Identifier of a message in a group chat.
    MessageId,
    "message_id"
);

impl UserId {
    /// Generates an identifier for a user created without one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl GroupId {
    /// Generates a fresh random group identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ComplaintId {
    /// Generates a fresh random complaint identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_non_empty_string() {
        let id = UserId::new("user-123").unwrap();
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn user_id_rejects_empty_string() {
        match UserId::new("") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "user_id"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn group_id_rejects_blank_string() {
        assert!(GroupId::new("   ").is_err());
    }

    #[test]
    fn generated_group_ids_are_unique() {
        assert_ne!(GroupId::generate(), GroupId::generate());
    }

    #[test]
    fn generated_complaint_id_is_uuid() {
        let id = ComplaintId::generate();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn generated_user_and_message_ids_are_uuids() {
        assert!(Uuid::parse_str(UserId::generate().as_str()).is_ok());
        assert!(Uuid::parse_str(MessageId::generate().as_str()).is_ok());
    }

    #[test]
    fn complaint_id_parses_from_str() {
        let id: ComplaintId = "c-1".parse().unwrap();
        assert_eq!(id.to_string(), "c-1");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = GroupId::new("G1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"G1\"");
    }
}
