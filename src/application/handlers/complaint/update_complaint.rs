//! UpdateComplaintHandler - Sender edits a complaint's title or message.

use std::sync::Arc;

use super::{check, load_complaint};
use crate::application::records::complaint_edit_document;
use crate::domain::authorization::Operation;
use crate::domain::complaint::ComplaintError;
use crate::domain::foundation::{Actor, ComplaintId};
use crate::ports::{Collection, DocumentStore};

/// Command to edit a complaint. Blank or missing fields are left unchanged.
#[derive(Debug, Clone)]
pub struct UpdateComplaintCommand {
    pub complaint_id: ComplaintId,
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateComplaintResult {
    /// False when the command carried nothing to change.
    pub updated: bool,
}

pub struct UpdateComplaintHandler {
    store: Arc<dyn DocumentStore>,
}

impl UpdateComplaintHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: UpdateComplaintCommand,
    ) -> Result<UpdateComplaintResult, ComplaintError> {
        let mut complaint = load_complaint(self.store.as_ref(), &cmd.complaint_id).await?;
        check(actor, &Operation::MutateComplaint { sender: &complaint.sender_id })?;

        if !complaint.edit(cmd.title.as_deref(), cmd.message.as_deref()) {
            return Ok(UpdateComplaintResult { updated: false });
        }

        self.store
            .put(
                &Collection::Complaints,
                complaint.id.as_str(),
                complaint_edit_document(&complaint),
                true,
            )
            .await?;

        tracing::info!(complaint_id = %complaint.id, "complaint updated");
        Ok(UpdateComplaintResult { updated: true })
    }
}
