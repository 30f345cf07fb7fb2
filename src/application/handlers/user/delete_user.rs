//! DeleteUserHandler - Admins remove a user record.

use std::sync::Arc;

use super::check_admin;
use crate::application::directory::MembershipDirectory;
use crate::application::handlers::group::{mutate_group, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::domain::directory::DirectoryError;
use crate::domain::foundation::{Actor, UserId};
use crate::ports::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct DeleteUserCommand {
    pub user_id: UserId,
}

pub struct DeleteUserHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl DeleteUserHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    /// Removes a student from every roster, then deletes the record.
    /// A group's supervisor must be replaced before they can be deleted.
    pub async fn handle(&self, actor: &Actor, cmd: DeleteUserCommand) -> Result<(), DirectoryError> {
        check_admin(actor)?;
        if cmd.user_id == actor.id {
            return Err(DirectoryError::validation(
                "user_id",
                "admins cannot delete their own account",
            ));
        }
        let user = self.directory.get_user(&cmd.user_id).await?;

        let groups = self.directory.groups_of_member(&user.id).await?;
        if let Some(supervised) = groups.iter().find(|g| g.supervisor_id() == &user.id) {
            return Err(DirectoryError::already_in_group(
                user.id.clone(),
                supervised.id().clone(),
            ));
        }
        for group in &groups {
            mutate_group(
                &self.directory,
                self.store.as_ref(),
                group.id(),
                DEFAULT_GROUP_WRITE_ATTEMPTS,
                |g| Ok(g.remove_student(&user.id)),
            )
            .await?;
        }

        self.store.delete(&Collection::Users, user.id.as_str()).await?;
        tracing::info!(actor_id = %actor.id, user_id = %user.id, groups_left = groups.len(), "user deleted");
        Ok(())
    }
}
