//! Complaint command and query handlers.

mod create_complaint;
mod delete_complaint;
mod list_complaints;
mod list_supervisors;
mod mark_read;
mod update_complaint;

pub use create_complaint::{CreateComplaintCommand, CreateComplaintHandler};
pub use delete_complaint::{DeleteComplaintCommand, DeleteComplaintHandler};
pub use list_complaints::{ComplaintView, ListComplaintsHandler};
pub use list_supervisors::ListSupervisorsHandler;
pub use mark_read::{MarkReadCommand, MarkReadHandler, MarkReadOutcome, DEFAULT_MARK_READ_ATTEMPTS};
pub use update_complaint::{UpdateComplaintCommand, UpdateComplaintHandler, UpdateComplaintResult};

use crate::domain::authorization::{authorize, Operation};
use crate::domain::complaint::{Complaint, ComplaintError};
use crate::domain::directory::DirectoryError;
use crate::domain::foundation::{Actor, ComplaintId};
use crate::ports::{Collection, DocumentStore, StoreError};

impl From<StoreError> for ComplaintError {
    fn from(err: StoreError) -> Self {
        ComplaintError::infrastructure(err.to_string())
    }
}

impl From<DirectoryError> for ComplaintError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::GroupNotFound(id) => ComplaintError::GroupNotFound(id),
            DirectoryError::UserNotFound(id) => ComplaintError::UserNotFound(id),
            DirectoryError::Forbidden(reason) => ComplaintError::denied(reason),
            DirectoryError::ValidationFailed { field, message } => {
                ComplaintError::ValidationFailed { field, message }
            }
            other => ComplaintError::infrastructure(other.message()),
        }
    }
}

fn check(actor: &Actor, operation: &Operation<'_>) -> Result<(), ComplaintError> {
    authorize(actor, operation)
        .into_result()
        .map_err(ComplaintError::denied)
}

async fn load_complaint(
    store: &dyn DocumentStore,
    id: &ComplaintId,
) -> Result<Complaint, ComplaintError> {
    let doc = store
        .get(&Collection::Complaints, id.as_str())
        .await?
        .ok_or_else(|| ComplaintError::not_found(id.clone()))?;
    Ok(Complaint::try_from(&doc)?)
}
