//! Stored document layouts.
//!
//! Records keep the field names existing deployments already hold
//! (`displayName`, `profId`, `toProfId`, `readBy`, ...). Conversions into
//! domain types validate what the document shape cannot: a complaint must
//! name exactly one target, a group's supervisor may not be one of its
//! students.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::domain::activity::{ChatMessage, DailyMessageCount};
use crate::domain::chat::ChatPost;
use crate::domain::complaint::{AddressingKind, Complaint, ComplaintTarget, ReadBy};
use crate::domain::directory::{Group, NoteLog, Progress, User};
use crate::domain::foundation::{ComplaintId, GroupId, MessageId, Role, Timestamp, UserId};
use crate::ports::{encode, Document, StoreError, StoredDocument};

// ─────────────────────────────────────────────────────────────────────────────
// Field names used in filters
// ─────────────────────────────────────────────────────────────────────────────

pub const FIELD_GROUP_ID: &str = "groupId";
pub const FIELD_SUPERVISOR_ID: &str = "profId";
pub const FIELD_STUDENT_IDS: &str = "studentIds";
pub const FIELD_SENDER_ID: &str = "fromUserId";
pub const FIELD_TO_SUPERVISOR: &str = "toProfId";
pub const FIELD_TO_STUDENT: &str = "toStudentId";
pub const FIELD_READ_BY: &str = "readBy";
pub const FIELD_ROLE: &str = "role";
pub const FIELD_TIMESTAMP: &str = "timestamp";
pub const FIELD_REVISION: &str = "revision";
pub const FIELD_EMAIL: &str = "email";

fn invalid(id: &str, reason: impl Into<String>) -> StoreError {
    StoreError::InvalidDocument {
        id: id.to_string(),
        reason: reason.into(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    role: Role,
    #[serde(default)]
    group_id: Option<GroupId>,
}

impl TryFrom<&StoredDocument> for User {
    type Error = StoreError;

    fn try_from(doc: &StoredDocument) -> Result<Self, Self::Error> {
        let record: UserRecord = doc.decode()?;
        Ok(User {
            id: UserId::new(doc.id.as_str()).map_err(|e| invalid(&doc.id, e.to_string()))?,
            email: record.email,
            display_name: record.display_name,
            role: record.role,
            group_id: record.group_id,
        })
    }
}

/// Full user body, pointer included.
pub fn user_document(user: &User) -> Result<Document, StoreError> {
    encode(&UserRecord {
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        role: user.role,
        group_id: user.group_id.clone(),
    })
}

/// Merge body with the profile fields only, leaving the pointer alone.
/// Absent email or display name are stored as `null`.
pub fn profile_document(user: &User) -> Document {
    let optional = |value: &Option<String>| value.clone().map(Value::String).unwrap_or(Value::Null);
    let mut body = Document::new();
    body.insert(FIELD_EMAIL.to_string(), optional(&user.email));
    body.insert("displayName".to_string(), optional(&user.display_name));
    body.insert(FIELD_ROLE.to_string(), Value::String(user.role.as_str().to_string()));
    body
}

/// Merge body that only touches the group pointer. `None` stores `null`.
pub fn pointer_document(group_id: Option<&GroupId>) -> Document {
    let mut body = Document::new();
    body.insert(
        FIELD_GROUP_ID.to_string(),
        group_id
            .map(|id| Value::String(id.to_string()))
            .unwrap_or(Value::Null),
    );
    body
}

// ─────────────────────────────────────────────────────────────────────────────
// Groups
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupRecord {
    name: String,
    #[serde(default)]
    project_title: Option<String>,
    prof_id: UserId,
    #[serde(default)]
    student_ids: Vec<UserId>,
    #[serde(default)]
    progress: i64,
    #[serde(default)]
    notes: NoteLog,
    /// Absent until the first guarded write.
    #[serde(default, skip_serializing_if = "is_zero")]
    revision: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl TryFrom<&StoredDocument> for Group {
    type Error = StoreError;

    fn try_from(doc: &StoredDocument) -> Result<Self, Self::Error> {
        let record: GroupRecord = doc.decode()?;
        let id = GroupId::new(doc.id.as_str()).map_err(|e| invalid(&doc.id, e.to_string()))?;
        let progress = Progress::try_new(record.progress.clamp(0, i64::from(Progress::MAX)))
            .map_err(|e| invalid(&doc.id, e.to_string()))?;
        let student_ids: BTreeSet<UserId> = record.student_ids.into_iter().collect();
        if student_ids.contains(&record.prof_id) {
            return Err(invalid(&doc.id, "supervisor is also listed as a student"));
        }
        Ok(Group::reconstitute(
            id,
            record.name,
            record.project_title,
            record.prof_id,
            student_ids,
            progress,
            record.notes,
            Some(doc.created_at),
            record.revision,
        ))
    }
}

pub fn group_document(group: &Group) -> Result<Document, StoreError> {
    encode(&GroupRecord {
        name: group.name().to_string(),
        project_title: group.project_title().map(str::to_string),
        prof_id: group.supervisor_id().clone(),
        student_ids: group.student_ids().iter().cloned().collect(),
        progress: i64::from(group.progress().value()),
        notes: group.notes().clone(),
        revision: group.revision(),
    })
}

/// Guard value a group read at `revision` must still hold to be written.
pub fn revision_guard(revision: u64) -> Value {
    if revision == 0 {
        Value::Null
    } else {
        Value::from(revision)
    }
}

/// Full group body stamped with the next revision, for a guarded write.
pub fn next_revision_document(group: &Group) -> Result<Document, StoreError> {
    let mut body = group_document(group)?;
    body.insert(
        FIELD_REVISION.to_string(),
        Value::from(group.revision().saturating_add(1)),
    );
    Ok(body)
}

// ─────────────────────────────────────────────────────────────────────────────
// Complaints
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplaintRecord {
    title: String,
    message: String,
    from_user_id: UserId,
    from_role: Role,
    #[serde(default)]
    to_prof_id: Option<UserId>,
    #[serde(default)]
    to_student_id: Option<UserId>,
    #[serde(default)]
    group_id: Option<GroupId>,
    #[serde(rename = "type")]
    kind: AddressingKind,
    #[serde(default)]
    read_by: ReadBy,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<&StoredDocument> for Complaint {
    type Error = StoreError;

    fn try_from(doc: &StoredDocument) -> Result<Self, Self::Error> {
        let record: ComplaintRecord = doc.decode()?;
        let target = match (record.to_prof_id, record.to_student_id, record.group_id) {
            (Some(id), None, None) => ComplaintTarget::Supervisor(id),
            (None, Some(id), None) => ComplaintTarget::Student(id),
            (None, None, Some(id)) => ComplaintTarget::Group(id),
            _ => return Err(invalid(&doc.id, "complaint must name exactly one target")),
        };
        if target.kind() != record.kind {
            return Err(invalid(
                &doc.id,
                format!("type '{}' does not match the target", record.kind.as_str()),
            ));
        }
        Ok(Complaint {
            id: ComplaintId::new(doc.id.as_str()).map_err(|e| invalid(&doc.id, e.to_string()))?,
            sender_id: record.from_user_id,
            sender_role: record.from_role,
            target,
            title: record.title,
            message: record.message,
            read_by: record.read_by,
            created_at: doc.created_at,
        })
    }
}

pub fn complaint_document(complaint: &Complaint) -> Result<Document, StoreError> {
    let (to_prof_id, to_student_id, group_id) = match &complaint.target {
        ComplaintTarget::Supervisor(id) => (Some(id.clone()), None, None),
        ComplaintTarget::Student(id) => (None, Some(id.clone()), None),
        ComplaintTarget::Group(id) => (None, None, Some(id.clone())),
    };
    encode(&ComplaintRecord {
        title: complaint.title.clone(),
        message: complaint.message.clone(),
        from_user_id: complaint.sender_id.clone(),
        from_role: complaint.sender_role,
        to_prof_id,
        to_student_id,
        group_id,
        kind: complaint.target.kind(),
        read_by: complaint.read_by.clone(),
        created_at: Some(complaint.created_at.to_rfc3339()),
    })
}

/// Merge body carrying only the editable fields.
pub fn complaint_edit_document(complaint: &Complaint) -> Document {
    let mut body = Document::new();
    body.insert("title".to_string(), Value::String(complaint.title.clone()));
    body.insert(
        "message".to_string(),
        Value::String(complaint.message.clone()),
    );
    body
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat messages
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatMessageRecord {
    #[serde(default)]
    sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_role: Option<Role>,
    timestamp: String,
    #[serde(default, alias = "content")]
    text: Option<String>,
}

fn parse_timestamp(id: &str, value: &str) -> Result<Timestamp, StoreError> {
    Timestamp::parse_rfc3339(value).ok_or_else(|| invalid(id, format!("bad timestamp '{}'", value)))
}

/// Decodes one message of `group_id`'s chat.
///
/// A blank sender id is read as a system message.
pub fn chat_message(group_id: &GroupId, doc: &StoredDocument) -> Result<ChatMessage, StoreError> {
    let record: ChatMessageRecord = doc.decode()?;
    let timestamp = parse_timestamp(&doc.id, &record.timestamp)?;
    Ok(ChatMessage {
        group_id: group_id.clone(),
        sender_id: record.sender_id.and_then(|s| UserId::new(s).ok()),
        timestamp,
        content: record.text.unwrap_or_default(),
    })
}

pub fn chat_message_document(message: &ChatMessage) -> Result<Document, StoreError> {
    encode(&ChatMessageRecord {
        sender_id: message.sender_id.as_ref().map(UserId::to_string),
        sender_role: None,
        timestamp: message.timestamp.to_rfc3339(),
        text: Some(message.content.clone()),
    })
}

/// Decodes a message posted by a user. System messages, which carry no
/// sender, decode to `None`.
pub fn chat_post(group_id: &GroupId, doc: &StoredDocument) -> Result<Option<ChatPost>, StoreError> {
    let record: ChatMessageRecord = doc.decode()?;
    let Some(sender_id) = record.sender_id.and_then(|s| UserId::new(s).ok()) else {
        return Ok(None);
    };
    Ok(Some(ChatPost {
        id: MessageId::new(doc.id.as_str()).map_err(|e| invalid(&doc.id, e.to_string()))?,
        group_id: group_id.clone(),
        sender_id,
        sender_role: record.sender_role,
        text: record.text.unwrap_or_default(),
        timestamp: parse_timestamp(&doc.id, &record.timestamp)?,
    }))
}

pub fn chat_post_document(post: &ChatPost) -> Result<Document, StoreError> {
    encode(&ChatMessageRecord {
        sender_id: Some(post.sender_id.to_string()),
        sender_role: post.sender_role,
        timestamp: post.timestamp.to_rfc3339(),
        text: Some(post.text.clone()),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Daily message counts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyCountRecord {
    user_id: UserId,
    group_id: GroupId,
    date: NaiveDate,
    count: u64,
}

impl TryFrom<&StoredDocument> for DailyMessageCount {
    type Error = StoreError;

    fn try_from(doc: &StoredDocument) -> Result<Self, Self::Error> {
        let record: DailyCountRecord = doc.decode()?;
        Ok(DailyMessageCount {
            user_id: record.user_id,
            group_id: record.group_id,
            day: record.date,
            count: record.count,
        })
    }
}

pub fn daily_count_document(row: &DailyMessageCount) -> Result<Document, StoreError> {
    encode(&DailyCountRecord {
        user_id: row.user_id.clone(),
        group_id: row.group_id.clone(),
        date: row.day,
        count: row.count,
    })
}
