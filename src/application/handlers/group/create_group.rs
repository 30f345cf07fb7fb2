//! CreateGroupHandler - Admin command creating a group and linking its members.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{check, ensure_candidate, insert_group, sync_pointers};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::{DirectoryError, Group};
use crate::domain::foundation::{Actor, GroupId, Role, UserId};
use crate::ports::DocumentStore;

/// Command to create a group.
#[derive(Debug, Clone)]
pub struct CreateGroupCommand {
    pub name: String,
    pub supervisor_id: UserId,
    pub student_ids: Vec<UserId>,
    pub project_title: Option<String>,
}

/// Handler for creating groups.
pub struct CreateGroupHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl CreateGroupHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: CreateGroupCommand,
    ) -> Result<Group, DirectoryError> {
        check(actor, &Operation::MutateGroup)?;

        let student_ids: BTreeSet<UserId> = cmd.student_ids.into_iter().collect();
        let group = Group::new(
            GroupId::generate(),
            cmd.name,
            cmd.supervisor_id,
            student_ids,
            cmd.project_title,
        )?;

        ensure_candidate(
            &self.directory,
            group.supervisor_id(),
            Role::Supervisor,
            "supervisor_id",
            None,
        )
        .await?;
        for student in group.student_ids() {
            ensure_candidate(&self.directory, student, Role::Student, "student_ids", None).await?;
        }

        insert_group(self.store.as_ref(), &group).await?;
        sync_pointers(&self.directory, group.id(), &group.link_all()).await?;

        tracing::info!(
            group_id = %group.id(),
            supervisor_id = %group.supervisor_id(),
            students = group.student_ids().len(),
            "group created"
        );
        self.directory.get_group(group.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::group::test_support::*;
    use crate::domain::authorization::DenyReason;
    use crate::ports::Collection;

    fn command(supervisor: &str, students: &[&str]) -> CreateGroupCommand {
        CreateGroupCommand {
            name: "  Team Rocket ".to_string(),
            supervisor_id: uid(supervisor),
            student_ids: students.iter().map(|s| uid(s)).collect(),
            project_title: Some("Rust compiler".to_string()),
        }
    }

    #[tokio::test]
    async fn creates_group_and_links_every_member() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store.clone()));

        let group = handler.handle(&admin(), command("S2", &["U3", "U4"])).await.unwrap();
        assert_eq!(group.name(), "Team Rocket");
        assert!(group.created_at().is_some());

        let directory = MembershipDirectory::new(Arc::new(store.clone()));
        for id in ["S2", "U3", "U4"] {
            assert_eq!(directory.group_of(&uid(id)).await.unwrap().as_ref(), Some(group.id()));
        }
        assert_eq!(store.count(&Collection::Groups).await, 2);
    }

    #[tokio::test]
    async fn non_admin_is_rejected_before_any_write() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store.clone()));
        let supervisor = Actor::new(uid("S1"), Role::Supervisor);

        let err = handler.handle(&supervisor, command("S2", &["U3"])).await.unwrap_err();
        assert_eq!(err, DirectoryError::Forbidden(DenyReason::WrongRole));
        assert_eq!(store.count(&Collection::Groups).await, 1);
    }

    #[tokio::test]
    async fn student_listed_as_supervisor_is_a_validation_error() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store.clone()));

        let err = handler.handle(&admin(), command("U3", &["U4"])).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ValidationFailed { ref field, .. } if field == "supervisor_id"));
        assert_eq!(store.count(&Collection::Groups).await, 1);
    }

    #[tokio::test]
    async fn student_of_another_group_cannot_join_a_new_one() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store.clone()));

        let err = handler.handle(&admin(), command("S2", &["U3", "U1"])).await.unwrap_err();
        assert_eq!(err, DirectoryError::already_in_group(uid("U1"), gid("G1")));
        assert_eq!(err.code(), crate::domain::foundation::ErrorCode::Conflict);
        assert_eq!(store.count(&Collection::Groups).await, 1);

        let directory = MembershipDirectory::new(Arc::new(store));
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), Some(gid("G1")));
        assert_eq!(directory.group_of(&uid("U3")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn supervisor_of_another_group_is_rejected() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store));

        let err = handler.handle(&admin(), command("S1", &["U3"])).await.unwrap_err();
        assert_eq!(err, DirectoryError::already_in_group(uid("S1"), gid("G1")));
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store));

        let err = handler.handle(&admin(), command("S2", &["U9"])).await.unwrap_err();
        assert_eq!(err, DirectoryError::UserNotFound(uid("U9")));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = workspace().await;
        let handler = CreateGroupHandler::new(Arc::new(store));
        let mut cmd = command("S2", &["U3"]);
        cmd.name = "   ".to_string();

        assert!(matches!(
            handler.handle(&admin(), cmd).await,
            Err(DirectoryError::ValidationFailed { .. })
        ));
    }
}
