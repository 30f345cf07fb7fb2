//! UpdateGroupHandler - Admin command editing a group's details and roster.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{check, ensure_candidate, mutate_group, sync_pointers, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::{DirectoryError, Group};
use crate::domain::foundation::{Actor, GroupId, Role, UserId};
use crate::ports::DocumentStore;

/// Command to update a group. `None` leaves a field unchanged; an empty
/// project title clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateGroupCommand {
    pub group_id: Option<GroupId>,
    pub name: Option<String>,
    pub project_title: Option<String>,
    pub supervisor_id: Option<UserId>,
    pub student_ids: Option<Vec<UserId>>,
}

impl UpdateGroupCommand {
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }
}

/// Handler for updating groups.
pub struct UpdateGroupHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl UpdateGroupHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: UpdateGroupCommand,
    ) -> Result<Group, DirectoryError> {
        check(actor, &Operation::MutateGroup)?;

        let group_id = cmd
            .group_id
            .ok_or_else(|| DirectoryError::validation("group_id", "is required"))?;
        // Existence first, so an unknown group is reported as such.
        self.directory.get_group(&group_id).await?;

        if let Some(supervisor_id) = &cmd.supervisor_id {
            ensure_candidate(
                &self.directory,
                supervisor_id,
                Role::Supervisor,
                "supervisor_id",
                Some(&group_id),
            )
            .await?;
        }
        let student_ids: Option<BTreeSet<UserId>> =
            cmd.student_ids.map(|ids| ids.into_iter().collect());
        if let Some(ids) = &student_ids {
            for student in ids {
                ensure_candidate(&self.directory, student, Role::Student, "student_ids", Some(&group_id))
                    .await?;
            }
        }

        let (group, pointer_updates) = mutate_group(
            &self.directory,
            self.store.as_ref(),
            &group_id,
            DEFAULT_GROUP_WRITE_ATTEMPTS,
            |group| {
                if let Some(name) = &cmd.name {
                    group.rename(name.as_str())?;
                }
                if let Some(title) = &cmd.project_title {
                    group.set_project_title(Some(title.clone()));
                }
                Ok(group.change_roster(cmd.supervisor_id.clone(), student_ids.clone())?)
            },
        )
        .await?;
        sync_pointers(&self.directory, group.id(), &pointer_updates).await?;

        tracing::info!(
            group_id = %group.id(),
            pointer_updates = pointer_updates.len(),
            "group updated"
        );
        self.directory.get_group(group.id()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::group::test_support::*;
    use crate::domain::authorization::DenyReason;

    #[tokio::test]
    async fn roster_change_moves_pointers() {
        let store = workspace().await;
        let directory = MembershipDirectory::new(Arc::new(store.clone()));
        let handler = UpdateGroupHandler::new(Arc::new(store));

        let mut cmd = UpdateGroupCommand::for_group(gid("G1"));
        cmd.supervisor_id = Some(uid("S2"));
        cmd.student_ids = Some(vec![uid("U2"), uid("U3")]);
        let group = handler.handle(&admin(), cmd).await.unwrap();

        assert_eq!(group.supervisor_id(), &uid("S2"));
        assert_eq!(directory.group_of(&uid("S1")).await.unwrap(), None);
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), None);
        assert_eq!(directory.group_of(&uid("U2")).await.unwrap(), Some(gid("G1")));
        assert_eq!(directory.group_of(&uid("U3")).await.unwrap(), Some(gid("G1")));
        assert_eq!(directory.group_of(&uid("S2")).await.unwrap(), Some(gid("G1")));
    }

    #[tokio::test]
    async fn rename_keeps_roster_and_pointers() {
        let store = workspace().await;
        let directory = MembershipDirectory::new(Arc::new(store.clone()));
        let handler = UpdateGroupHandler::new(Arc::new(store));

        let mut cmd = UpdateGroupCommand::for_group(gid("G1"));
        cmd.name = Some("Renamed".to_string());
        cmd.project_title = Some(String::new());
        let group = handler.handle(&admin(), cmd).await.unwrap();

        assert_eq!(group.name(), "Renamed");
        assert_eq!(group.project_title(), None);
        assert_eq!(group.student_ids().len(), 2);
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), Some(gid("G1")));
    }

    #[tokio::test]
    async fn member_of_another_group_cannot_be_added() {
        let store = workspace().await;
        seed_group(&store, "G2", "S2", &["U3"]).await;
        let directory = MembershipDirectory::new(Arc::new(store.clone()));
        let handler = UpdateGroupHandler::new(Arc::new(store));

        let mut cmd = UpdateGroupCommand::for_group(gid("G2"));
        cmd.student_ids = Some(vec![uid("U3"), uid("U1")]);
        let err = handler.handle(&admin(), cmd).await.unwrap_err();
        assert_eq!(err, DirectoryError::already_in_group(uid("U1"), gid("G1")));

        let mut cmd = UpdateGroupCommand::for_group(gid("G2"));
        cmd.supervisor_id = Some(uid("S1"));
        let err = handler.handle(&admin(), cmd).await.unwrap_err();
        assert_eq!(err, DirectoryError::already_in_group(uid("S1"), gid("G1")));

        let g2 = directory.get_group(&gid("G2")).await.unwrap();
        assert_eq!(g2.student_ids().len(), 1);
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), Some(gid("G1")));
    }

    #[tokio::test]
    async fn moving_a_student_between_groups_takes_two_steps() {
        let store = workspace().await;
        seed_group(&store, "G2", "S2", &["U3"]).await;
        let directory = MembershipDirectory::new(Arc::new(store.clone()));
        let handler = UpdateGroupHandler::new(Arc::new(store));

        let mut leave = UpdateGroupCommand::for_group(gid("G1"));
        leave.student_ids = Some(vec![uid("U2")]);
        handler.handle(&admin(), leave).await.unwrap();
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), None);

        let mut join = UpdateGroupCommand::for_group(gid("G2"));
        join.student_ids = Some(vec![uid("U3"), uid("U1")]);
        handler.handle(&admin(), join).await.unwrap();
        assert_eq!(directory.group_of(&uid("U1")).await.unwrap(), Some(gid("G2")));
        assert_eq!(directory.groups_of_member(&uid("U1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn adding_a_supervisor_as_student_is_rejected() {
        let store = workspace().await;
        let handler = UpdateGroupHandler::new(Arc::new(store));

        let mut cmd = UpdateGroupCommand::for_group(gid("G1"));
        cmd.student_ids = Some(vec![uid("U1"), uid("S2")]);
        let err = handler.handle(&admin(), cmd).await.unwrap_err();
        assert!(matches!(err, DirectoryError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let store = workspace().await;
        let handler = UpdateGroupHandler::new(Arc::new(store));
        let err = handler
            .handle(&admin(), UpdateGroupCommand::for_group(gid("G9")))
            .await
            .unwrap_err();
        assert_eq!(err, DirectoryError::GroupNotFound(gid("G9")));
    }

    #[tokio::test]
    async fn student_cannot_update() {
        let store = workspace().await;
        let handler = UpdateGroupHandler::new(Arc::new(store));
        let student = Actor::new(uid("U1"), Role::Student);
        let err = handler
            .handle(&student, UpdateGroupCommand::for_group(gid("G1")))
            .await
            .unwrap_err();
        assert_eq!(err.deny_reason(), Some(DenyReason::WrongRole));
    }
}
