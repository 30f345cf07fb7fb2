//! UpdateNoteHandler - Replace the text of a progress note by its key.

use std::sync::Arc;

use super::{check, mutate_group, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::{DirectoryError, NoteKey, ProgressNote};
use crate::domain::foundation::{Actor, GroupId};
use crate::ports::DocumentStore;

#[derive(Debug, Clone)]
pub struct UpdateNoteCommand {
    pub group_id: GroupId,
    pub timestamp: String,
    pub text: String,
}

pub struct UpdateNoteHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl UpdateNoteHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: UpdateNoteCommand,
    ) -> Result<ProgressNote, DirectoryError> {
        let key = NoteKey::new(cmd.timestamp)?;
        let (_, note) = mutate_group(
            &self.directory,
            self.store.as_ref(),
            &cmd.group_id,
            DEFAULT_GROUP_WRITE_ATTEMPTS,
            |group| {
                check(actor, &Operation::EditGroupNotes { members: &group.members() })?;
                Ok(group.update_note(&key, cmd.text.as_str())?)
            },
        )
        .await?;
        Ok(note)
    }
}
