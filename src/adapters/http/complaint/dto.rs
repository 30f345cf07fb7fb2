//! HTTP DTOs for complaint endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{ComplaintView, MarkReadOutcome};
use crate::domain::complaint::{Addressing, ComplaintStatus, ComplaintTarget};
use crate::domain::directory::User;
use crate::domain::foundation::{GroupId, Role, UserId, ValidationError};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// New complaint. Exactly one of the three recipient fields must be set;
/// blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateComplaintRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "toProfId", alias = "to_prof_id")]
    pub to_supervisor: Option<String>,
    #[serde(default, alias = "toStudentId")]
    pub to_student: Option<String>,
    #[serde(default, alias = "groupId", alias = "group_id")]
    pub to_group: Option<String>,
}

fn present(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

impl CreateComplaintRequest {
    pub fn addressing(&self) -> Result<Addressing, ValidationError> {
        Ok(Addressing {
            to_supervisor: present(self.to_supervisor.clone())
                .map(UserId::new)
                .transpose()?,
            to_student: present(self.to_student.clone())
                .map(UserId::new)
                .transpose()?,
            to_group: present(self.to_group.clone()).map(GroupId::new).transpose()?,
        })
    }
}

/// Partial edit. Absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComplaintRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CreateComplaintResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    pub target: ComplaintTarget,
    pub sender_id: String,
    pub sender_role: Role,
    pub sender_name: String,
    pub status: ComplaintStatus,
    pub read_by: Vec<String>,
    pub created_at: String,
}

impl From<ComplaintView> for ComplaintResponse {
    fn from(view: ComplaintView) -> Self {
        Self {
            id: view.id.to_string(),
            title: view.title,
            message: view.message,
            target: view.target,
            sender_id: view.sender_id.to_string(),
            sender_role: view.sender_role,
            sender_name: view.sender_name,
            status: view.status,
            read_by: view.read_by.iter().map(|id| id.to_string()).collect(),
            created_at: view.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateComplaintResponse {
    pub updated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    pub outcome: &'static str,
}

impl From<MarkReadOutcome> for MarkReadResponse {
    fn from(outcome: MarkReadOutcome) -> Self {
        let outcome = match outcome {
            MarkReadOutcome::Recorded => "recorded",
            MarkReadOutcome::AlreadyRead => "already_read",
            MarkReadOutcome::NotVisible => "not_visible",
        };
        Self { outcome }
    }
}

/// A supervisor of one of the caller's groups.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<User> for SupervisorResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.label().to_string(),
            email: user.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_recipient_fields_are_absent() {
        let req: CreateComplaintRequest = serde_json::from_value(serde_json::json!({
            "title": "Noise",
            "message": "Too loud",
            "toProfId": "S1",
            "toStudentId": "",
            "groupId": "  ",
        }))
        .unwrap();
        let addressing = req.addressing().unwrap();
        assert_eq!(addressing.to_supervisor, Some(UserId::new("S1").unwrap()));
        assert_eq!(addressing.to_student, None);
        assert_eq!(addressing.to_group, None);
    }

    #[test]
    fn mark_read_outcome_names() {
        assert_eq!(MarkReadResponse::from(MarkReadOutcome::AlreadyRead).outcome, "already_read");
        assert_eq!(MarkReadResponse::from(MarkReadOutcome::NotVisible).outcome, "not_visible");
    }
}
