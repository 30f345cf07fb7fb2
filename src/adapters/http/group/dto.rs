//! HTTP DTOs for group endpoints.
//!
//! Requests accept snake_case fields; the camelCase spellings used by the
//! stored documents are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{GroupView, MemberView};
use crate::domain::directory::{Group, GroupMembers, ProgressNote};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(alias = "profId", alias = "supervisorId")]
    pub supervisor_id: String,
    #[serde(default, alias = "studentIds")]
    pub student_ids: Vec<String>,
    #[serde(default, alias = "projectTitle")]
    pub project_title: Option<String>,
}

/// Partial group update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "projectTitle")]
    pub project_title: Option<String>,
    #[serde(default, alias = "profId", alias = "supervisorId")]
    pub supervisor_id: Option<String>,
    #[serde(default, alias = "studentIds")]
    pub student_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProgressRequest {
    pub progress: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddNoteRequest {
    pub timestamp: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNoteRequest {
    pub text: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<MemberView> for MemberResponse {
    fn from(view: MemberView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name,
            email: view.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub project_title: Option<String>,
    pub supervisor: MemberResponse,
    pub students: Vec<MemberResponse>,
    pub progress: u8,
    pub notes: Vec<ProgressNote>,
    pub created_at: Option<String>,
}

impl From<GroupView> for GroupResponse {
    fn from(view: GroupView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name,
            project_title: view.project_title,
            supervisor: view.supervisor.into(),
            students: view.students.into_iter().map(Into::into).collect(),
            progress: view.progress,
            notes: view.notes,
            created_at: view.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A group as written, without member details.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRecordResponse {
    pub id: String,
    pub name: String,
    pub project_title: Option<String>,
    pub supervisor_id: String,
    pub student_ids: Vec<String>,
    pub progress: u8,
}

impl From<&Group> for GroupRecordResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id().to_string(),
            name: group.name().to_string(),
            project_title: group.project_title().map(str::to_string),
            supervisor_id: group.supervisor_id().to_string(),
            student_ids: group.student_ids().iter().map(|id| id.to_string()).collect(),
            progress: group.progress().value(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MembersResponse {
    pub group_id: String,
    pub supervisor_id: String,
    pub student_ids: Vec<String>,
}

impl From<GroupMembers> for MembersResponse {
    fn from(members: GroupMembers) -> Self {
        Self {
            group_id: members.group_id.to_string(),
            supervisor_id: members.supervisor_id.to_string(),
            student_ids: members.student_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub progress: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_stored_field_names() {
        let req: CreateGroupRequest = serde_json::from_value(serde_json::json!({
            "name": "Team A",
            "profId": "S1",
            "studentIds": ["U1", "U2"],
        }))
        .unwrap();
        assert_eq!(req.supervisor_id, "S1");
        assert_eq!(req.student_ids, vec!["U1", "U2"]);
        assert_eq!(req.project_title, None);
    }

    #[test]
    fn update_request_fields_are_optional() {
        let req: UpdateGroupRequest =
            serde_json::from_value(serde_json::json!({"name": "Renamed"})).unwrap();
        assert_eq!(req.name.as_deref(), Some("Renamed"));
        assert!(req.student_ids.is_none());
        assert!(req.supervisor_id.is_none());
    }
}
