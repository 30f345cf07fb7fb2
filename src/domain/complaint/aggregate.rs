//! Complaint aggregate entity.
//!
//! A complaint is a titled message from one user to exactly one target: a
//! supervisor, a student, or a whole group. Its read status is never stored;
//! it is derived from the read-by set and, for group complaints, the group's
//! current student members.

use serde::{Deserialize, Serialize};

use super::{ComplaintError, ComplaintStatus, ComplaintTarget, Visibility};
use crate::domain::directory::GroupMembers;
use crate::domain::foundation::{Actor, ComplaintId, Role, Timestamp, UserId};

/// Viewers who have acknowledged a complaint, in acknowledgement order.
///
/// Append-only and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<UserId>", into = "Vec<UserId>")]
pub struct ReadBy(Vec<UserId>);

impl ReadBy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `user_id`; returns false if it was already present.
    pub fn insert(&mut self, user_id: UserId) -> bool {
        if self.contains(&user_id) {
            return false;
        }
        self.0.push(user_id);
        true
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.0.iter().any(|id| id == user_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<UserId>> for ReadBy {
    fn from(ids: Vec<UserId>) -> Self {
        let mut read_by = ReadBy::new();
        for id in ids {
            read_by.insert(id);
        }
        read_by
    }
}

impl From<ReadBy> for Vec<UserId> {
    fn from(read_by: ReadBy) -> Self {
        read_by.0
    }
}

/// Complaint aggregate.
///
/// # Invariants
///
/// - `target` is set exactly once, at creation
/// - `title` and `message` are non-blank
/// - `read_by` never shrinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
    pub id: ComplaintId,
    pub sender_id: UserId,
    pub sender_role: Role,
    pub target: ComplaintTarget,
    pub title: String,
    pub message: String,
    pub read_by: ReadBy,
    /// Assigned by the store on first write.
    pub created_at: Timestamp,
}

impl Complaint {
    /// Create a new complaint with an empty read-by set.
    ///
    /// Title and message are trimmed and must be non-empty.
    pub fn new(
        id: ComplaintId,
        sender: &Actor,
        target: ComplaintTarget,
        title: &str,
        message: &str,
    ) -> Result<Self, ComplaintError> {
        let title = required("title", title)?;
        let message = required("message", message)?;
        Ok(Self {
            id,
            sender_id: sender.id.clone(),
            sender_role: sender.role,
            target,
            title,
            message,
            read_by: ReadBy::new(),
            created_at: Timestamp::now(),
        })
    }

    /// How `viewer` relates to this complaint.
    ///
    /// `group` must be the current members of the target group when the
    /// complaint is group-addressed; it is ignored otherwise.
    pub fn visibility_for(&self, viewer: &UserId, group: Option<&GroupMembers>) -> Visibility {
        if &self.sender_id == viewer {
            return Visibility::Sender;
        }
        match &self.target {
            ComplaintTarget::Supervisor(id) | ComplaintTarget::Student(id) if id == viewer => {
                Visibility::Recipient
            }
            ComplaintTarget::Group(group_id) => match group {
                Some(members) if &members.group_id == group_id && members.has_student(viewer) => {
                    Visibility::GroupMember
                }
                _ => Visibility::Hidden,
            },
            _ => Visibility::Hidden,
        }
    }

    /// Status seen by a recipient: open once they acknowledged it.
    pub fn status_for_viewer(&self, viewer: &UserId) -> ComplaintStatus {
        ComplaintStatus::from_open(self.read_by.contains(viewer))
    }

    /// Status seen by the sender.
    ///
    /// Individual complaints are open once the recipient acknowledged them.
    /// Group complaints are open once every current student member of the
    /// group has acknowledged them; an empty or missing group stays unread.
    pub fn status_for_sender(&self, group: Option<&GroupMembers>) -> ComplaintStatus {
        let open = match &self.target {
            ComplaintTarget::Supervisor(id) | ComplaintTarget::Student(id) => {
                self.read_by.contains(id)
            }
            ComplaintTarget::Group(group_id) => match group {
                Some(members) if &members.group_id == group_id => {
                    !members.student_ids.is_empty()
                        && members.student_ids.iter().all(|s| self.read_by.contains(s))
                }
                _ => false,
            },
        };
        ComplaintStatus::from_open(open)
    }

    /// Applies a title/message edit. Blank values are ignored.
    ///
    /// Returns false when nothing was supplied.
    pub fn edit(&mut self, title: Option<&str>, message: Option<&str>) -> bool {
        let title = non_blank(title);
        let message = non_blank(message);
        let changed = title.is_some() || message.is_some();
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(message) = message {
            self.message = message;
        }
        changed
    }

    /// Records an acknowledgement; returns false if already recorded.
    pub fn mark_read(&mut self, viewer: UserId) -> bool {
        self.read_by.insert(viewer)
    }
}

fn required(field: &str, value: &str) -> Result<String, ComplaintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ComplaintError::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::GroupId;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn gid(id: &str) -> GroupId {
        GroupId::new(id).unwrap()
    }

    fn student(id: &str) -> Actor {
        Actor::new(uid(id), Role::Student)
    }

    fn members(group: &str, students: &[&str]) -> GroupMembers {
        GroupMembers {
            group_id: gid(group),
            supervisor_id: uid("S1"),
            student_ids: students.iter().map(|s| uid(s)).collect::<BTreeSet<_>>(),
        }
    }

    fn complaint(target: ComplaintTarget) -> Complaint {
        Complaint::new(ComplaintId::new("C1").unwrap(), &student("U1"), target, "Title", "Body")
            .unwrap()
    }

    #[test]
    fn new_trims_and_starts_unread() {
        let c = Complaint::new(
            ComplaintId::new("C1").unwrap(),
            &student("U1"),
            ComplaintTarget::Supervisor(uid("S1")),
            "  Late feedback ",
            " Please review ",
        )
        .unwrap();
        assert_eq!(c.title, "Late feedback");
        assert_eq!(c.message, "Please review");
        assert!(c.read_by.is_empty());
        assert_eq!(c.sender_role, Role::Student);
    }

    #[test]
    fn new_rejects_blank_fields() {
        let result = Complaint::new(
            ComplaintId::new("C1").unwrap(),
            &student("U1"),
            ComplaintTarget::Supervisor(uid("S1")),
            "   ",
            "body",
        );
        assert!(matches!(
            result,
            Err(ComplaintError::ValidationFailed { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn individual_status_follows_recipient_ack() {
        let mut c = complaint(ComplaintTarget::Supervisor(uid("S1")));
        assert_eq!(c.status_for_sender(None), ComplaintStatus::Unread);
        assert_eq!(c.status_for_viewer(&uid("S1")), ComplaintStatus::Unread);

        assert!(c.mark_read(uid("S1")));
        assert_eq!(c.status_for_sender(None), ComplaintStatus::Open);
        assert_eq!(c.status_for_viewer(&uid("S1")), ComplaintStatus::Open);
    }

    #[test]
    fn group_status_opens_after_every_member_acks() {
        let group = members("G1", &["U2", "U3", "U4"]);
        let mut c = complaint(ComplaintTarget::Group(gid("G1")));

        c.mark_read(uid("U2"));
        c.mark_read(uid("U3"));
        assert_eq!(c.status_for_sender(Some(&group)), ComplaintStatus::Unread);

        c.mark_read(uid("U4"));
        assert_eq!(c.status_for_sender(Some(&group)), ComplaintStatus::Open);
    }

    #[test]
    fn group_status_ignores_readers_who_left() {
        let mut c = complaint(ComplaintTarget::Group(gid("G1")));
        c.mark_read(uid("U2"));
        c.mark_read(uid("GONE"));
        let group = members("G1", &["U2", "U3"]);
        assert_eq!(c.status_for_sender(Some(&group)), ComplaintStatus::Unread);
    }

    #[test]
    fn empty_or_missing_group_stays_unread() {
        let c = complaint(ComplaintTarget::Group(gid("G1")));
        assert_eq!(c.status_for_sender(Some(&members("G1", &[]))), ComplaintStatus::Unread);
        assert_eq!(c.status_for_sender(None), ComplaintStatus::Unread);
    }

    #[test]
    fn visibility_covers_sender_recipient_and_members() {
        let individual = complaint(ComplaintTarget::Student(uid("U7")));
        assert_eq!(individual.visibility_for(&uid("U1"), None), Visibility::Sender);
        assert_eq!(individual.visibility_for(&uid("U7"), None), Visibility::Recipient);
        assert_eq!(individual.visibility_for(&uid("U8"), None), Visibility::Hidden);

        let group_complaint = complaint(ComplaintTarget::Group(gid("G1")));
        let group = members("G1", &["U2"]);
        assert_eq!(
            group_complaint.visibility_for(&uid("U2"), Some(&group)),
            Visibility::GroupMember
        );
        assert_eq!(
            group_complaint.visibility_for(&uid("U3"), Some(&group)),
            Visibility::Hidden
        );
        assert_eq!(
            group_complaint.visibility_for(&uid("U2"), Some(&members("G2", &["U2"]))),
            Visibility::Hidden
        );
    }

    #[test]
    fn edit_skips_blank_values() {
        let mut c = complaint(ComplaintTarget::Supervisor(uid("S1")));
        assert!(!c.edit(Some("   "), None));
        assert_eq!(c.title, "Title");

        assert!(c.edit(Some(" New title "), Some("")));
        assert_eq!(c.title, "New title");
        assert_eq!(c.message, "Body");
    }

    #[test]
    fn read_by_deserialization_deduplicates() {
        let read_by: ReadBy = serde_json::from_value(serde_json::json!(["a", "b", "a"])).unwrap();
        assert_eq!(read_by.len(), 2);
    }

    proptest! {
        #[test]
        fn mark_read_is_idempotent(ids in proptest::collection::vec("[a-d]", 0..12)) {
            let mut once = complaint(ComplaintTarget::Supervisor(uid("S1")));
            let mut twice = once.clone();
            for id in &ids {
                once.mark_read(uid(id));
                twice.mark_read(uid(id));
                twice.mark_read(uid(id));
            }
            prop_assert_eq!(&once.read_by, &twice.read_by);
            let distinct: BTreeSet<&String> = ids.iter().collect();
            prop_assert_eq!(once.read_by.len(), distinct.len());
        }
    }
}
