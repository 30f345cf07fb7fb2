//! UpdateProgressHandler - Set a group's completion percentage.

use std::sync::Arc;

use super::{check, mutate_group, DEFAULT_GROUP_WRITE_ATTEMPTS};
use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::Operation;
use crate::domain::directory::{DirectoryError, Progress};
use crate::domain::foundation::{Actor, GroupId};
use crate::ports::DocumentStore;

#[derive(Debug, Clone)]
pub struct UpdateProgressCommand {
    pub group_id: GroupId,
    /// Raw client value; must be within 0..=100.
    pub progress: i64,
}

pub struct UpdateProgressHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl UpdateProgressHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: UpdateProgressCommand,
    ) -> Result<Progress, DirectoryError> {
        let (group, progress) = mutate_group(
            &self.directory,
            self.store.as_ref(),
            &cmd.group_id,
            DEFAULT_GROUP_WRITE_ATTEMPTS,
            |group| {
                check(actor, &Operation::UpdateGroupProgress { members: &group.members() })?;
                let progress = Progress::try_new(cmd.progress)?;
                group.set_progress(progress);
                Ok(progress)
            },
        )
        .await?;

        tracing::info!(group_id = %group.id(), progress = %progress, "progress updated");
        Ok(progress)
    }
}
