//! Group aggregate entity.
//!
//! A group ties one supervisor to a set of students. The aggregate owns the
//! member set; the matching per-user group pointer lives on the user record and
//! is kept in step by the directory service using the [`PointerUpdate`]s this
//! aggregate reports for every membership-changing mutation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::notes::{NoteError, NoteKey, NoteLog, ProgressNote};
use super::progress::Progress;
use crate::domain::foundation::{GroupId, Timestamp, UserId, ValidationError};

/// Maximum length for a group name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Supervisor plus student set of a group, resolved for authorization checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembers {
    pub group_id: GroupId,
    pub supervisor_id: UserId,
    pub student_ids: BTreeSet<UserId>,
}

impl GroupMembers {
    pub fn has_student(&self, user_id: &UserId) -> bool {
        self.student_ids.contains(user_id)
    }

    pub fn is_supervisor(&self, user_id: &UserId) -> bool {
        &self.supervisor_id == user_id
    }

    pub fn student_count(&self) -> usize {
        self.student_ids.len()
    }
}

/// A write the directory must apply to a user's group pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerUpdate {
    pub user_id: UserId,
    pub group_id: Option<GroupId>,
}

impl PointerUpdate {
    fn link(user_id: UserId, group_id: &GroupId) -> Self {
        Self {
            user_id,
            group_id: Some(group_id.clone()),
        }
    }

    fn unlink(user_id: UserId) -> Self {
        Self {
            user_id,
            group_id: None,
        }
    }
}

/// Group aggregate.
///
/// # Invariants
///
/// - `name` is non-blank and at most 200 characters
/// - the supervisor is never also listed as a student
/// - note keys are unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: String,
    project_title: Option<String>,
    supervisor_id: UserId,
    student_ids: BTreeSet<UserId>,
    progress: Progress,
    notes: NoteLog,
    created_at: Option<Timestamp>,
    /// Number of committed writes; guards concurrent read-modify-write.
    revision: u64,
}

impl Group {
    /// Create a new group with no notes and zero progress.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        supervisor_id: UserId,
        student_ids: BTreeSet<UserId>,
        project_title: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = Self::validate_name(name.into())?;
        Self::validate_roster(&supervisor_id, &student_ids)?;
        Ok(Self {
            id,
            name,
            project_title: normalize_optional(project_title),
            supervisor_id,
            student_ids,
            progress: Progress::default(),
            notes: NoteLog::new(),
            created_at: None,
            revision: 0,
        })
    }

    /// Reconstitute a group from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: GroupId,
        name: String,
        project_title: Option<String>,
        supervisor_id: UserId,
        student_ids: BTreeSet<UserId>,
        progress: Progress,
        notes: NoteLog,
        created_at: Option<Timestamp>,
        revision: u64,
    ) -> Self {
        Self {
            id,
            name,
            project_title,
            supervisor_id,
            student_ids,
            progress,
            notes,
            created_at,
            revision,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &GroupId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_title(&self) -> Option<&str> {
        self.project_title.as_deref()
    }

    pub fn supervisor_id(&self) -> &UserId {
        &self.supervisor_id
    }

    pub fn student_ids(&self) -> &BTreeSet<UserId> {
        &self.student_ids
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn notes(&self) -> &NoteLog {
        &self.notes
    }

    pub fn created_at(&self) -> Option<&Timestamp> {
        self.created_at.as_ref()
    }

    /// Revision this copy was read at.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Resolved member view used by authorization checks.
    pub fn members(&self) -> GroupMembers {
        GroupMembers {
            group_id: self.id.clone(),
            supervisor_id: self.supervisor_id.clone(),
            student_ids: self.student_ids.clone(),
        }
    }

    /// Pointer writes linking every member (supervisor first) to this group.
    pub fn link_all(&self) -> Vec<PointerUpdate> {
        std::iter::once(self.supervisor_id.clone())
            .chain(self.student_ids.iter().cloned())
            .map(|id| PointerUpdate::link(id, &self.id))
            .collect()
    }

    /// Pointer writes clearing every member's link to this group.
    ///
    /// The directory applies these only to users whose pointer still names
    /// this group.
    pub fn unlink_all(&self) -> Vec<PointerUpdate> {
        std::iter::once(self.supervisor_id.clone())
            .chain(self.student_ids.iter().cloned())
            .map(PointerUpdate::unlink)
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name = Self::validate_name(name.into())?;
        Ok(())
    }

    pub fn set_project_title(&mut self, title: Option<String>) {
        self.project_title = normalize_optional(title);
    }

    /// Replace the supervisor and/or student set.
    ///
    /// Returns the pointer writes needed to keep user records consistent:
    /// unlinks for everyone who left, links for everyone who joined. Checking
    /// that joiners are free to join is the caller's job.
    pub fn change_roster(
        &mut self,
        supervisor_id: Option<UserId>,
        student_ids: Option<BTreeSet<UserId>>,
    ) -> Result<Vec<PointerUpdate>, ValidationError> {
        let new_supervisor = supervisor_id.unwrap_or_else(|| self.supervisor_id.clone());
        let new_students = student_ids.unwrap_or_else(|| self.student_ids.clone());
        Self::validate_roster(&new_supervisor, &new_students)?;

        let before = self.all_member_ids();
        let mut after = new_students.clone();
        after.insert(new_supervisor.clone());

        let mut updates: Vec<PointerUpdate> = before
            .difference(&after)
            .cloned()
            .map(PointerUpdate::unlink)
            .collect();
        updates.extend(
            after
                .difference(&before)
                .cloned()
                .map(|id| PointerUpdate::link(id, &self.id)),
        );

        self.supervisor_id = new_supervisor;
        self.student_ids = new_students;
        Ok(updates)
    }

    /// Adds one student, returning the pointer write for them.
    pub fn add_student(&mut self, student_id: UserId) -> Result<Vec<PointerUpdate>, ValidationError> {
        let mut students = self.student_ids.clone();
        students.insert(student_id);
        self.change_roster(None, Some(students))
    }

    /// Removes one student, returning the pointer write for them (empty if
    /// they were not a member).
    pub fn remove_student(&mut self, student_id: &UserId) -> Vec<PointerUpdate> {
        if !self.student_ids.remove(student_id) {
            return Vec::new();
        }
        vec![PointerUpdate::unlink(student_id.clone())]
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    pub fn add_note(&mut self, note: ProgressNote) -> Result<(), NoteError> {
        self.notes.append(note)
    }

    pub fn update_note(&mut self, key: &NoteKey, text: impl Into<String>) -> Result<ProgressNote, NoteError> {
        self.notes.replace(key, text).cloned()
    }

    pub fn delete_note(&mut self, key: &NoteKey) -> Result<ProgressNote, NoteError> {
        self.notes.remove(key)
    }

    fn all_member_ids(&self) -> BTreeSet<UserId> {
        let mut ids = self.student_ids.clone();
        ids.insert(self.supervisor_id.clone());
        ids
    }

    fn validate_name(name: String) -> Result<String, ValidationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::invalid_format(
                "name",
                format!("must be at most {} characters", MAX_NAME_LENGTH),
            ));
        }
        Ok(trimmed.to_string())
    }

    fn validate_roster(
        supervisor_id: &UserId,
        student_ids: &BTreeSet<UserId>,
    ) -> Result<(), ValidationError> {
        if student_ids.contains(supervisor_id) {
            return Err(ValidationError::invalid_format(
                "student_ids",
                "the supervisor cannot also be a student member",
            ));
        }
        Ok(())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn students(ids: &[&str]) -> BTreeSet<UserId> {
        ids.iter().map(|id| uid(id)).collect()
    }

    fn test_group() -> Group {
        Group::new(
            GroupId::new("G1").unwrap(),
            "Compilers",
            uid("S1"),
            students(&["U1", "U2"]),
            Some("Borrow checker visualizer".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn new_trims_name_and_starts_empty() {
        let group = Group::new(
            GroupId::new("G1").unwrap(),
            "  Networks ",
            uid("S1"),
            BTreeSet::new(),
            Some("   ".to_string()),
        )
        .unwrap();
        assert_eq!(group.name(), "Networks");
        assert_eq!(group.project_title(), None);
        assert_eq!(group.progress().value(), 0);
        assert!(group.notes().is_empty());
    }

    #[test]
    fn new_rejects_blank_name() {
        let result = Group::new(GroupId::new("G1").unwrap(), " ", uid("S1"), BTreeSet::new(), None);
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn new_rejects_supervisor_as_student() {
        let result = Group::new(
            GroupId::new("G1").unwrap(),
            "Compilers",
            uid("S1"),
            students(&["S1"]),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn link_all_covers_supervisor_and_students() {
        let updates = test_group().link_all();
        let linked: Vec<&str> = updates.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(linked, vec!["S1", "U1", "U2"]);
        assert!(updates
            .iter()
            .all(|u| u.group_id.as_ref().map(|g| g.as_str()) == Some("G1")));
    }

    #[test]
    fn unlink_all_clears_every_member() {
        let updates = test_group().unlink_all();
        assert_eq!(updates.len(), 3);
        assert!(updates.iter().all(|u| u.group_id.is_none()));
    }

    #[test]
    fn change_roster_reports_joins_and_leaves() {
        let mut group = test_group();
        let updates = group
            .change_roster(Some(uid("S2")), Some(students(&["U2", "U3"])))
            .unwrap();

        let unlinked: BTreeSet<&str> = updates
            .iter()
            .filter(|u| u.group_id.is_none())
            .map(|u| u.user_id.as_str())
            .collect();
        let linked: BTreeSet<&str> = updates
            .iter()
            .filter(|u| u.group_id.is_some())
            .map(|u| u.user_id.as_str())
            .collect();

        assert_eq!(unlinked, ["S1", "U1"].into_iter().collect());
        assert_eq!(linked, ["S2", "U3"].into_iter().collect());
        assert_eq!(group.supervisor_id().as_str(), "S2");
        assert!(group.members().has_student(&uid("U3")));
        assert!(!group.members().has_student(&uid("U1")));
    }

    #[test]
    fn change_roster_without_changes_is_empty() {
        let mut group = test_group();
        assert!(group.change_roster(None, None).unwrap().is_empty());
    }

    #[test]
    fn add_and_remove_single_students() {
        let mut group = test_group();
        let joined = group.add_student(uid("U3")).unwrap();
        assert_eq!(joined, vec![PointerUpdate::link(uid("U3"), &GroupId::new("G1").unwrap())]);

        let left = group.remove_student(&uid("U1"));
        assert_eq!(left, vec![PointerUpdate::unlink(uid("U1"))]);
        assert!(group.remove_student(&uid("U9")).is_empty());
        assert!(group.add_student(uid("S1")).is_err());
        assert_eq!(group.student_ids(), &students(&["U2", "U3"]));
    }

    #[test]
    fn members_view_answers_membership_questions() {
        let members = test_group().members();
        assert!(members.is_supervisor(&uid("S1")));
        assert!(members.has_student(&uid("U1")));
        assert!(!members.has_student(&uid("S1")));
        assert_eq!(members.student_count(), 2);
    }

    #[test]
    fn note_operations_go_through_the_log() {
        let mut group = test_group();
        let key = NoteKey::new("2024-05-01T08:00:00Z").unwrap();
        group
            .add_note(ProgressNote::new(key.clone(), "Parser done").unwrap())
            .unwrap();
        let updated = group.update_note(&key, "Parser and lexer done").unwrap();
        assert_eq!(updated.text, "Parser and lexer done");
        let removed = group.delete_note(&key).unwrap();
        assert_eq!(removed.timestamp, key);
        assert!(group.notes().is_empty());
    }
}
