//! DeleteComplaintHandler - Sender removes a complaint.

use std::sync::Arc;

use super::{check, load_complaint};
use crate::domain::authorization::Operation;
use crate::domain::complaint::ComplaintError;
use crate::domain::foundation::{Actor, ComplaintId};
use crate::ports::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct DeleteComplaintCommand {
    pub complaint_id: ComplaintId,
}

pub struct DeleteComplaintHandler {
    store: Arc<dyn DocumentStore>,
}

impl DeleteComplaintHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, actor: &Actor, cmd: DeleteComplaintCommand) -> Result<(), ComplaintError> {
        let complaint = load_complaint(self.store.as_ref(), &cmd.complaint_id).await?;
        check(actor, &Operation::MutateComplaint { sender: &complaint.sender_id })?;

        if !self
            .store
            .delete(&Collection::Complaints, complaint.id.as_str())
            .await?
        {
            return Err(ComplaintError::not_found(complaint.id));
        }
        tracing::info!(complaint_id = %complaint.id, "complaint deleted");
        Ok(())
    }
}
