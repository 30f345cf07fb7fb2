//! UpdateUserHandler - Admins edit a profile, change a role, or move a user
//! in or out of a group.

use std::sync::Arc;

use super::{check_admin, ensure_email_free, normalize_email};
use crate::application::directory::MembershipDirectory;
use crate::application::handlers::group::{mutate_group, sync_pointers, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::application::records::profile_document;
use crate::domain::directory::{DirectoryError, User};
use crate::domain::foundation::{Actor, GroupId, Role, UserId};
use crate::ports::{Collection, DocumentStore};

/// Requested group assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    /// Students join the roster; supervisors take over the group.
    Join(GroupId),
    /// Leave every group. Supervisors must be replaced first.
    Leave,
}

/// Command to update a user. `None` fields are left unchanged.
#[derive(Debug, Clone)]
pub struct UpdateUserCommand {
    pub user_id: UserId,
    pub email: Option<String>,
    /// A blank name clears it.
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub membership: Option<Membership>,
}

impl UpdateUserCommand {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            display_name: None,
            role: None,
            membership: None,
        }
    }
}

pub struct UpdateUserHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
    max_attempts: u32,
}

impl UpdateUserHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
            max_attempts: DEFAULT_GROUP_WRITE_ATTEMPTS,
        }
    }

    pub async fn handle(&self, actor: &Actor, cmd: UpdateUserCommand) -> Result<User, DirectoryError> {
        check_admin(actor)?;
        let mut user = self.directory.get_user(&cmd.user_id).await?;
        let mut profile_changed = false;

        if let Some(email) = cmd.email {
            let email = normalize_email(&email)?;
            if user.email.as_deref() != Some(email.as_str()) {
                ensure_email_free(self.store.as_ref(), &email, Some(&user.id)).await?;
                user.email = Some(email);
                profile_changed = true;
            }
        }
        if let Some(name) = cmd.display_name {
            let name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
            if name != user.display_name {
                user.display_name = name;
                profile_changed = true;
            }
        }
        if let Some(role) = cmd.role.filter(|role| *role != user.role) {
            // Rosters record members by role; a member keeps theirs.
            self.directory.ensure_free_to_join(&user, None).await?;
            user.role = role;
            profile_changed = true;
        }

        if profile_changed {
            self.store
                .put(&Collection::Users, user.id.as_str(), profile_document(&user), true)
                .await?;
        }

        match &cmd.membership {
            Some(Membership::Join(group_id)) => self.join(&user, group_id).await?,
            Some(Membership::Leave) => self.leave(&user).await?,
            None => {}
        }

        tracing::info!(
            actor_id = %actor.id,
            user_id = %user.id,
            profile_changed,
            membership = ?cmd.membership,
            "user updated"
        );
        self.directory.get_user(&user.id).await
    }

    async fn join(&self, user: &User, group_id: &GroupId) -> Result<(), DirectoryError> {
        self.directory.ensure_free_to_join(user, Some(group_id)).await?;
        let (_, updates) = match user.role {
            Role::Student => {
                mutate_group(&self.directory, self.store.as_ref(), group_id, self.max_attempts, |group| {
                    Ok(group.add_student(user.id.clone())?)
                })
                .await?
            }
            Role::Supervisor => {
                mutate_group(&self.directory, self.store.as_ref(), group_id, self.max_attempts, |group| {
                    Ok(group.change_roster(Some(user.id.clone()), None)?)
                })
                .await?
            }
            Role::Admin => {
                return Err(DirectoryError::validation(
                    "group_id",
                    "admins do not belong to groups",
                ))
            }
        };
        sync_pointers(&self.directory, group_id, &updates).await?;
        // Rejoining a group already listing the user yields no update.
        self.directory.set_membership(&user.id, Some(group_id)).await
    }

    async fn leave(&self, user: &User) -> Result<(), DirectoryError> {
        let groups = self.directory.groups_of_member(&user.id).await?;
        if let Some(supervised) = groups.iter().find(|g| g.supervisor_id() == &user.id) {
            return Err(DirectoryError::validation(
                "group_id",
                format!(
                    "{} supervises group {}; assign another supervisor first",
                    user.id,
                    supervised.id()
                ),
            ));
        }

        for group in &groups {
            let (_, updates) =
                mutate_group(&self.directory, self.store.as_ref(), group.id(), self.max_attempts, |g| {
                    Ok(g.remove_student(&user.id))
                })
                .await?;
            sync_pointers(&self.directory, group.id(), &updates).await?;
        }
        if user.group_id.is_some() {
            self.directory.set_membership(&user.id, None).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::document_store::InMemoryDocumentStore;
    use crate::application::handlers::group::test_support::*;
    use crate::domain::directory::Group;

    async fn stored_group(store: &InMemoryDocumentStore, group: &str) -> Group {
        let doc = store.get(&Collection::Groups, group).await.unwrap().unwrap();
        Group::try_from(&doc).unwrap()
    }

    async fn roster(store: &InMemoryDocumentStore, group: &str) -> Vec<String> {
        let group = stored_group(store, group).await;
        group.student_ids().iter().map(|id| id.to_string()).collect()
    }

    async fn pointer(store: &InMemoryDocumentStore, user: &str) -> Option<GroupId> {
        let doc = store.get(&Collection::Users, user).await.unwrap().unwrap();
        User::try_from(&doc).unwrap().group_id
    }

    #[tokio::test]
    async fn profile_fields_change_without_touching_pointer() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store.clone()));
        let mut cmd = UpdateUserCommand::new(uid("U1"));
        cmd.email = Some("una@school.test".to_string());
        cmd.display_name = Some("Una".to_string());

        let user = handler.handle(&admin(), cmd).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("una@school.test"));
        assert_eq!(user.label(), "Una");
        assert_eq!(user.group_id, Some(gid("G1")));
    }

    #[tokio::test]
    async fn email_taken_by_someone_else_is_refused() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store));
        let mut cmd = UpdateUserCommand::new(uid("U1"));
        cmd.email = Some("u2@school.test".to_string());

        assert_eq!(
            handler.handle(&admin(), cmd).await,
            Err(DirectoryError::UserExists("u2@school.test".to_string()))
        );
    }

    #[tokio::test]
    async fn role_changes_only_outside_groups() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store));

        let mut member = UpdateUserCommand::new(uid("U1"));
        member.role = Some(Role::Supervisor);
        assert_eq!(
            handler.handle(&admin(), member).await,
            Err(DirectoryError::already_in_group(uid("U1"), gid("G1")))
        );

        let mut free = UpdateUserCommand::new(uid("U3"));
        free.role = Some(Role::Supervisor);
        assert_eq!(handler.handle(&admin(), free).await.unwrap().role, Role::Supervisor);
    }

    #[tokio::test]
    async fn student_joins_a_group_through_its_roster() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store.clone()));
        let mut cmd = UpdateUserCommand::new(uid("U3"));
        cmd.membership = Some(Membership::Join(gid("G1")));

        let user = handler.handle(&admin(), cmd).await.unwrap();
        assert_eq!(user.group_id, Some(gid("G1")));
        assert_eq!(roster(&store, "G1").await, vec!["U1", "U2", "U3"]);
    }

    #[tokio::test]
    async fn member_of_another_group_cannot_join() {
        let store = workspace().await;
        seed_group(&store, "G2", "S2", &["U4"]).await;
        let handler = UpdateUserHandler::new(Arc::new(store.clone()));
        let mut cmd = UpdateUserCommand::new(uid("U1"));
        cmd.membership = Some(Membership::Join(gid("G2")));

        assert_eq!(
            handler.handle(&admin(), cmd).await,
            Err(DirectoryError::already_in_group(uid("U1"), gid("G1")))
        );
        assert_eq!(roster(&store, "G2").await, vec!["U4"]);
    }

    #[tokio::test]
    async fn supervisor_join_replaces_the_previous_one() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store.clone()));
        let mut cmd = UpdateUserCommand::new(uid("S2"));
        cmd.membership = Some(Membership::Join(gid("G1")));

        handler.handle(&admin(), cmd).await.unwrap();
        let group = stored_group(&store, "G1").await;
        assert_eq!(group.supervisor_id(), &uid("S2"));
        assert_eq!(pointer(&store, "S2").await, Some(gid("G1")));
        assert_eq!(pointer(&store, "S1").await, None);
    }

    #[tokio::test]
    async fn student_leaves_and_supervisor_must_be_replaced() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store.clone()));

        let mut leave = UpdateUserCommand::new(uid("U1"));
        leave.membership = Some(Membership::Leave);
        handler.handle(&admin(), leave).await.unwrap();
        assert_eq!(roster(&store, "G1").await, vec!["U2"]);
        assert_eq!(pointer(&store, "U1").await, None);

        let mut supervisor = UpdateUserCommand::new(uid("S1"));
        supervisor.membership = Some(Membership::Leave);
        assert!(matches!(
            handler.handle(&admin(), supervisor).await,
            Err(DirectoryError::ValidationFailed { ref field, .. }) if field == "group_id"
        ));
        assert_eq!(pointer(&store, "S1").await, Some(gid("G1")));
    }

    #[tokio::test]
    async fn admins_cannot_join_groups() {
        let store = workspace().await;
        let handler = UpdateUserHandler::new(Arc::new(store));
        let mut cmd = UpdateUserCommand::new(uid("A1"));
        cmd.membership = Some(Membership::Join(gid("G1")));

        assert!(matches!(
            handler.handle(&admin(), cmd).await,
            Err(DirectoryError::ValidationFailed { .. })
        ));
    }
}
