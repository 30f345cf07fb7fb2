//! Membership directory.
//!
//! Answers "who belongs where" from the users and groups collections. Group
//! records own the member set; each user carries a pointer to its group. The
//! directory reads both and writes pointers; group handlers write the group
//! record and then the pointers it reports.

use std::sync::Arc;

use crate::application::records::{
    pointer_document, FIELD_STUDENT_IDS, FIELD_SUPERVISOR_ID,
};
use crate::domain::directory::{DirectoryError, Group, GroupMembers, PointerUpdate, User};
use crate::domain::foundation::{Actor, GroupId, Role, UserId};
use crate::ports::{Collection, DocumentStore, Filter, StoreError, StoredDocument};

impl From<StoreError> for DirectoryError {
    fn from(err: StoreError) -> Self {
        DirectoryError::infrastructure(err.to_string())
    }
}

/// Read and pointer-write access to memberships.
#[derive(Clone)]
pub struct MembershipDirectory {
    store: Arc<dyn DocumentStore>,
}

impl MembershipDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Groups the actor can see: all for admins, supervised groups for
    /// supervisors, joined groups for students. Unordered.
    pub async fn groups_visible_to(&self, actor: &Actor) -> Result<Vec<Group>, DirectoryError> {
        let filters = match actor.role {
            Role::Admin => vec![],
            Role::Supervisor => vec![Filter::eq(FIELD_SUPERVISOR_ID, actor.id.as_str())],
            Role::Student => vec![Filter::array_contains(
                FIELD_STUDENT_IDS,
                actor.id.as_str(),
            )],
        };
        let docs = self.store.query(&Collection::Groups, &filters).await?;
        decode_all(&docs)
    }

    /// Every group in the workspace.
    pub async fn all_groups(&self) -> Result<Vec<Group>, DirectoryError> {
        let docs = self.store.query(&Collection::Groups, &[]).await?;
        decode_all(&docs)
    }

    pub async fn get_group(&self, group_id: &GroupId) -> Result<Group, DirectoryError> {
        self.find_group(group_id)
            .await?
            .ok_or_else(|| DirectoryError::group_not_found(group_id.clone()))
    }

    pub async fn find_group(&self, group_id: &GroupId) -> Result<Option<Group>, DirectoryError> {
        let doc = self.store.get(&Collection::Groups, group_id.as_str()).await?;
        Ok(doc.as_ref().map(Group::try_from).transpose()?)
    }

    pub async fn members_of(&self, group_id: &GroupId) -> Result<GroupMembers, DirectoryError> {
        Ok(self.get_group(group_id).await?.members())
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<User, DirectoryError> {
        self.find_user(user_id)
            .await?
            .ok_or_else(|| DirectoryError::user_not_found(user_id.clone()))
    }

    pub async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, DirectoryError> {
        let doc = self.store.get(&Collection::Users, user_id.as_str()).await?;
        Ok(doc.as_ref().map(User::try_from).transpose()?)
    }

    /// The group a user's pointer names, if any.
    pub async fn group_of(&self, user_id: &UserId) -> Result<Option<GroupId>, DirectoryError> {
        Ok(self.find_user(user_id).await?.and_then(|u| u.group_id))
    }

    /// Writes a user's group pointer. Only the pointer field is touched.
    pub async fn set_membership(
        &self,
        user_id: &UserId,
        group_id: Option<&GroupId>,
    ) -> Result<(), DirectoryError> {
        self.store
            .put(
                &Collection::Users,
                user_id.as_str(),
                pointer_document(group_id),
                true,
            )
            .await?;
        Ok(())
    }

    /// Clears `user_id`'s pointer if it still names `group_id`.
    ///
    /// Returns false, writing nothing, when the user is gone or has since
    /// moved to another group.
    pub async fn clear_membership(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<bool, DirectoryError> {
        match self.find_user(user_id).await? {
            Some(user) if user.group_id.as_ref() == Some(group_id) => {
                self.set_membership(user_id, None).await?;
                Ok(true)
            }
            Some(user) => {
                tracing::debug!(
                    user_id = %user_id,
                    group_id = %group_id,
                    current = ?user.group_id,
                    "pointer no longer names the group, left as is"
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Applies `group_id`'s pointer writes in order, stopping at the first
    /// failure. Links always write; unlinks go through [`clear_membership`].
    ///
    /// [`clear_membership`]: Self::clear_membership
    pub async fn apply(
        &self,
        group_id: &GroupId,
        updates: &[PointerUpdate],
    ) -> Result<(), DirectoryError> {
        for update in updates {
            match &update.group_id {
                Some(target) => self.set_membership(&update.user_id, Some(target)).await?,
                None => {
                    self.clear_membership(&update.user_id, group_id).await?;
                }
            }
        }
        Ok(())
    }

    /// Groups whose record lists `user_id` as supervisor or student.
    pub async fn groups_of_member(&self, user_id: &UserId) -> Result<Vec<Group>, DirectoryError> {
        let supervised = self
            .store
            .query(
                &Collection::Groups,
                &[Filter::eq(FIELD_SUPERVISOR_ID, user_id.as_str())],
            )
            .await?;
        let joined = self
            .store
            .query(
                &Collection::Groups,
                &[Filter::array_contains(FIELD_STUDENT_IDS, user_id.as_str())],
            )
            .await?;

        let mut groups = decode_all(&supervised)?;
        for group in decode_all(&joined)? {
            if !groups.iter().any(|g| g.id() == group.id()) {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    /// Fails with `AlreadyInGroup` when `user` belongs to a live group other
    /// than `joining`, by either a group's roster or their own pointer.
    pub async fn ensure_free_to_join(
        &self,
        user: &User,
        joining: Option<&GroupId>,
    ) -> Result<(), DirectoryError> {
        if let Some(other) = self
            .groups_of_member(&user.id)
            .await?
            .into_iter()
            .find(|g| Some(g.id()) != joining)
        {
            return Err(DirectoryError::already_in_group(
                user.id.clone(),
                other.id().clone(),
            ));
        }

        if let Some(pointer) = &user.group_id {
            if Some(pointer) != joining && self.find_group(pointer).await?.is_some() {
                return Err(DirectoryError::already_in_group(
                    user.id.clone(),
                    pointer.clone(),
                ));
            }
        }
        Ok(())
    }

    /// True when `student` is a member of a group supervised by `supervisor`.
    pub async fn shares_group(
        &self,
        student: &UserId,
        supervisor: &UserId,
    ) -> Result<bool, DirectoryError> {
        let docs = self
            .store
            .query(
                &Collection::Groups,
                &[
                    Filter::array_contains(FIELD_STUDENT_IDS, student.as_str()),
                    Filter::eq(FIELD_SUPERVISOR_ID, supervisor.as_str()),
                ],
            )
            .await?;
        Ok(!docs.is_empty())
    }

    /// Supervisors of every group the student belongs to, deduplicated.
    ///
    /// Supervisors whose user record is missing are skipped.
    pub async fn supervisors_of(&self, student: &UserId) -> Result<Vec<User>, DirectoryError> {
        let groups = self
            .groups_visible_to(&Actor::new(student.clone(), Role::Student))
            .await?;

        let mut supervisor_ids: Vec<&UserId> = groups.iter().map(Group::supervisor_id).collect();
        supervisor_ids.sort();
        supervisor_ids.dedup();

        let mut supervisors = Vec::with_capacity(supervisor_ids.len());
        for id in supervisor_ids {
            match self.find_user(id).await? {
                Some(user) => supervisors.push(user),
                None => tracing::warn!(supervisor_id = %id, "group supervisor has no user record"),
            }
        }
        Ok(supervisors)
    }
}

fn decode_all(docs: &[StoredDocument]) -> Result<Vec<Group>, DirectoryError> {
    docs.iter()
        .map(|doc| Group::try_from(doc).map_err(DirectoryError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::document_store::InMemoryDocumentStore;
    use crate::application::records::{group_document, user_document};
    use std::collections::BTreeSet;

    fn uid(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn gid(id: &str) -> GroupId {
        GroupId::new(id).unwrap()
    }

    async fn seed_user(store: &InMemoryDocumentStore, id: &str, role: Role, name: &str) {
        let user = User {
            id: uid(id),
            email: None,
            display_name: Some(name.to_string()),
            role,
            group_id: None,
        };
        store
            .put(&Collection::Users, id, user_document(&user).unwrap(), false)
            .await
            .unwrap();
    }

    async fn seed_group(store: &InMemoryDocumentStore, id: &str, supervisor: &str, students: &[&str]) {
        let group = Group::new(
            gid(id),
            format!("Group {}", id),
            uid(supervisor),
            students.iter().map(|s| uid(s)).collect::<BTreeSet<_>>(),
            None,
        )
        .unwrap();
        store
            .put(&Collection::Groups, id, group_document(&group).unwrap(), false)
            .await
            .unwrap();
    }

    async fn fixture() -> (InMemoryDocumentStore, MembershipDirectory) {
        let store = InMemoryDocumentStore::new();
        seed_user(&store, "S1", Role::Supervisor, "Dr One").await;
        seed_user(&store, "S2", Role::Supervisor, "Dr Two").await;
        seed_user(&store, "U1", Role::Student, "Ana").await;
        seed_group(&store, "G1", "S1", &["U1", "U2"]).await;
        seed_group(&store, "G2", "S2", &["U3"]).await;
        seed_group(&store, "G3", "S1", &["U1"]).await;
        let directory = MembershipDirectory::new(Arc::new(store.clone()));
        (store, directory)
    }

    fn ids(groups: &[Group]) -> BTreeSet<String> {
        groups.iter().map(|g| g.id().to_string()).collect()
    }

    #[tokio::test]
    async fn visibility_follows_role() {
        let (_, directory) = fixture().await;

        let admin = Actor::new(uid("A1"), Role::Admin);
        assert_eq!(directory.groups_visible_to(&admin).await.unwrap().len(), 3);

        let supervisor = Actor::new(uid("S1"), Role::Supervisor);
        let seen = ids(&directory.groups_visible_to(&supervisor).await.unwrap());
        assert_eq!(seen, ["G1", "G3"].iter().map(|s| s.to_string()).collect());

        let student = Actor::new(uid("U3"), Role::Student);
        let seen = ids(&directory.groups_visible_to(&student).await.unwrap());
        assert_eq!(seen, ["G2".to_string()].into_iter().collect());
    }

    #[tokio::test]
    async fn members_of_unknown_group_is_not_found() {
        let (_, directory) = fixture().await;
        assert_eq!(
            directory.members_of(&gid("nope")).await,
            Err(DirectoryError::GroupNotFound(gid("nope")))
        );
        let members = directory.members_of(&gid("G1")).await.unwrap();
        assert!(members.has_student(&uid("U2")));
        assert!(members.is_supervisor(&uid("S1")));
    }

    #[tokio::test]
    async fn set_membership_only_touches_pointer() {
        let (_, directory) = fixture().await;
        directory.set_membership(&uid("U1"), Some(&gid("G1"))).await.unwrap();
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), Some(gid("G1")));

        directory.set_membership(&uid("U1"), None).await.unwrap();
        let user = directory.get_user(&uid("U1")).await.unwrap();
        assert_eq!(user.group_id, None);
        assert_eq!(user.label(), "Ana");
    }

    #[tokio::test]
    async fn clear_membership_spares_pointers_to_other_groups() {
        let (_, directory) = fixture().await;
        directory.set_membership(&uid("U1"), Some(&gid("G3"))).await.unwrap();

        assert!(!directory.clear_membership(&uid("U1"), &gid("G1")).await.unwrap());
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), Some(gid("G3")));

        assert!(directory.clear_membership(&uid("U1"), &gid("G3")).await.unwrap());
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), None);
        assert!(!directory.clear_membership(&uid("U9"), &gid("G3")).await.unwrap());
    }

    #[tokio::test]
    async fn groups_of_member_reads_rosters() {
        let (_, directory) = fixture().await;
        let supervised = ids(&directory.groups_of_member(&uid("S1")).await.unwrap());
        assert_eq!(supervised, ["G1", "G3"].iter().map(|s| s.to_string()).collect());
        let joined = ids(&directory.groups_of_member(&uid("U1")).await.unwrap());
        assert_eq!(joined, ["G1", "G3"].iter().map(|s| s.to_string()).collect());
        assert!(directory.groups_of_member(&uid("U9")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_free_to_join_checks_rosters_and_live_pointers() {
        let (store, directory) = fixture().await;
        seed_user(&store, "U4", Role::Student, "Dee").await;

        let s2 = directory.get_user(&uid("S2")).await.unwrap();
        assert_eq!(
            directory.ensure_free_to_join(&s2, None).await,
            Err(DirectoryError::already_in_group(uid("S2"), gid("G2")))
        );
        assert!(directory.ensure_free_to_join(&s2, Some(&gid("G2"))).await.is_ok());

        directory.set_membership(&uid("U4"), Some(&gid("G2"))).await.unwrap();
        let u4 = directory.get_user(&uid("U4")).await.unwrap();
        assert!(matches!(
            directory.ensure_free_to_join(&u4, Some(&gid("G1"))).await,
            Err(DirectoryError::AlreadyInGroup { .. })
        ));

        directory.set_membership(&uid("U4"), Some(&gid("deleted"))).await.unwrap();
        let u4 = directory.get_user(&uid("U4")).await.unwrap();
        assert!(directory.ensure_free_to_join(&u4, Some(&gid("G1"))).await.is_ok());
    }

    #[tokio::test]
    async fn shares_group_checks_supervisor_and_membership() {
        let (_, directory) = fixture().await;
        assert!(directory.shares_group(&uid("U1"), &uid("S1")).await.unwrap());
        assert!(!directory.shares_group(&uid("U1"), &uid("S2")).await.unwrap());
        assert!(!directory.shares_group(&uid("U9"), &uid("S1")).await.unwrap());
    }

    #[tokio::test]
    async fn supervisors_of_deduplicates_and_skips_missing_users() {
        let (store, directory) = fixture().await;
        let supervisors = directory.supervisors_of(&uid("U1")).await.unwrap();
        assert_eq!(supervisors.len(), 1);
        assert_eq!(supervisors[0].id, uid("S1"));

        seed_group(&store, "G4", "S9", &["U1"]).await;
        assert_eq!(directory.supervisors_of(&uid("U1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_outage_is_infrastructure_error() {
        let (store, directory) = fixture().await;
        store.make_unavailable(&Collection::Groups).await;
        let err = directory.members_of(&gid("G1")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Infrastructure(_)));
    }
}
