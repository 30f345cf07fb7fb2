//! AddNoteHandler - Student members append a progress note to their group.

use std::sync::Arc;

use super::{check, mutate_group, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::{DirectoryError, NoteKey, ProgressNote};
use crate::domain::foundation::{Actor, GroupId};
use crate::ports::DocumentStore;

#[derive(Debug, Clone)]
pub struct AddNoteCommand {
    pub group_id: GroupId,
    /// Client-supplied timestamp that identifies the note from now on.
    pub timestamp: String,
    pub text: String,
}

pub struct AddNoteHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
    max_attempts: u32,
}

impl AddNoteHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
            max_attempts: DEFAULT_GROUP_WRITE_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub async fn handle(&self, actor: &Actor, cmd: AddNoteCommand) -> Result<ProgressNote, DirectoryError> {
        let note = ProgressNote::new(NoteKey::new(cmd.timestamp)?, cmd.text)?;
        let (group, _) = mutate_group(
            &self.directory,
            self.store.as_ref(),
            &cmd.group_id,
            self.max_attempts,
            |group| {
                check(actor, &Operation::EditGroupNotes { members: &group.members() })?;
                Ok(group.add_note(note.clone())?)
            },
        )
        .await?;

        tracing::debug!(group_id = %group.id(), note = %note.timestamp, "note added");
        Ok(note)
    }
}
