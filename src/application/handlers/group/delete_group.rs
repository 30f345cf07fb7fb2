//! DeleteGroupHandler - Admin command removing a group and unlinking members.

use std::sync::Arc;

use super::{check, sync_pointers};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::DirectoryError;
use crate::domain::foundation::{Actor, GroupId};
use crate::ports::{Collection, DocumentStore};

/// Command to delete a group.
#[derive(Debug, Clone)]
pub struct DeleteGroupCommand {
    pub group_id: GroupId,
}

/// Handler for deleting groups.
pub struct DeleteGroupHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl DeleteGroupHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    /// Clears every member pointer that still names the group, then removes
    /// the group record.
    pub async fn handle(&self, actor: &Actor, cmd: DeleteGroupCommand) -> Result<(), DirectoryError> {
        check(actor, &Operation::MutateGroup)?;

        let group = self.directory.get_group(&cmd.group_id).await?;
        sync_pointers(&self.directory, group.id(), &group.unlink_all()).await?;
        self.store
            .delete(&Collection::Groups, group.id().as_str())
            .await?;

        tracing::info!(group_id = %group.id(), "group deleted");
        Ok(())
    }
}
