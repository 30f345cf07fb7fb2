//! DeleteNoteHandler - Remove a progress note by its key.

use std::sync::Arc;

use super::{check, mutate_group, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::{DirectoryError, NoteKey};
use crate::domain::foundation::{Actor, GroupId};
use crate::ports::DocumentStore;

#[derive(Debug, Clone)]
pub struct DeleteNoteCommand {
    pub group_id: GroupId,
    pub timestamp: String,
}

pub struct DeleteNoteHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl DeleteNoteHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    pub async fn handle(&self, actor: &Actor, cmd: DeleteNoteCommand) -> Result<(), DirectoryError> {
        let key = NoteKey::new(cmd.timestamp)?;
        mutate_group(
            &self.directory,
            self.store.as_ref(),
            &cmd.group_id,
            DEFAULT_GROUP_WRITE_ATTEMPTS,
            |group| {
                check(actor, &Operation::EditGroupNotes { members: &group.members() })?;
                group.delete_note(&key)?;
                Ok(())
            },
        )
        .await?;
        Ok(())
    }
}
