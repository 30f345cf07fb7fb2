//! MarkReadHandler - Record that a viewer acknowledged a complaint.

use serde_json::Value;
use std::sync::Arc;

use super::load_complaint;
use crate::application::directory::MembershipDirectory;
use crate::application::records::FIELD_READ_BY;
use crate::domain::authorization::{authorize, Decision, Operation};
use crate::domain::complaint::ComplaintError;
use crate::domain::foundation::{Actor, ComplaintId};
use crate::ports::{Collection, DocumentStore, StoreError};

/// Attempts made when concurrent writers keep conflicting.
pub const DEFAULT_MARK_READ_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct MarkReadCommand {
    pub complaint_id: ComplaintId,
}

/// What a mark-read call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkReadOutcome {
    /// The viewer was added to the read-by set.
    Recorded,
    /// The viewer had already acknowledged the complaint.
    AlreadyRead,
    /// The viewer cannot see the complaint; nothing was written.
    NotVisible,
}

pub struct MarkReadHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
    max_attempts: u32,
}

impl MarkReadHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
            max_attempts: DEFAULT_MARK_READ_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: MarkReadCommand,
    ) -> Result<MarkReadOutcome, ComplaintError> {
        let complaint = load_complaint(self.store.as_ref(), &cmd.complaint_id).await?;

        let members = match complaint.target.group() {
            Some(group_id) => self.directory.find_group(group_id).await?.map(|g| g.members()),
            None => None,
        };
        let visibility = complaint.visibility_for(&actor.id, members.as_ref());
        if let Decision::Deny(_) = authorize(actor, &Operation::MarkComplaintRead { visibility }) {
            return Ok(MarkReadOutcome::NotVisible);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self
                .store
                .add_to_set(
                    &Collection::Complaints,
                    complaint.id.as_str(),
                    FIELD_READ_BY,
                    Value::String(actor.id.to_string()),
                )
                .await
            {
                Ok(true) => {
                    tracing::debug!(complaint_id = %complaint.id, viewer = %actor.id, "complaint read");
                    return Ok(MarkReadOutcome::Recorded);
                }
                Ok(false) => return Ok(MarkReadOutcome::AlreadyRead),
                Err(StoreError::NotFound { .. }) => {
                    return Err(ComplaintError::not_found(complaint.id));
                }
                Err(e) if e.is_conflict() => {
                    if attempt >= self.max_attempts {
                        tracing::warn!(
                            complaint_id = %complaint.id,
                            attempts = attempt,
                            "giving up on read-by update after repeated conflicts"
                        );
                        return Err(ComplaintError::conflict(complaint.id));
                    }
                    tracing::debug!(complaint_id = %complaint.id, attempt, "read-by conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
