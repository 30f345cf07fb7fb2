//! Workspace user as seen by the membership directory.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{GroupId, Role, UserId};

/// A user record with its group pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Role,
    /// The group this user currently belongs to, if any.
    pub group_id: Option<GroupId>,
}

impl User {
    /// Display name, falling back to the email, then to a placeholder.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(UNKNOWN_USER_LABEL)
    }
}

/// Label shown for senders whose user record is missing.
pub const UNKNOWN_USER_LABEL: &str = "Unknown user";
