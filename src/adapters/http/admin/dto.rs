//! HTTP DTOs for admin endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::directory::User;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    /// Defaults to `student`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Partial user update.
///
/// `group_id` is tri-state: absent leaves membership alone, `null` leaves
/// every group, a group id joins that group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, alias = "groupId", deserialize_with = "present")]
    pub group_id: Option<Option<String>>,
}

/// Maps a present field, `null` included, to `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: String,
    pub group_id: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            display_name: user.display_name,
            role: user.role.to_string(),
            group_id: user.group_id.map(|id| id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(body: serde_json::Value) -> UpdateUserRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn group_id_distinguishes_absent_null_and_value() {
        assert_eq!(update(json!({})).group_id, None);
        assert_eq!(update(json!({"group_id": null})).group_id, Some(None));
        assert_eq!(
            update(json!({"groupId": "G1"})).group_id,
            Some(Some("G1".to_string()))
        );
    }
}
