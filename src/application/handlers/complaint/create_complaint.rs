//! CreateComplaintHandler - Validate, route and store a new complaint.

use std::sync::Arc;

use super::check;
use crate::application::directory::MembershipDirectory;
use crate::application::records::complaint_document;
use crate::domain::authorization::{AddressingFacts, Operation};
use crate::domain::complaint::{Addressing, Complaint, ComplaintError, ComplaintTarget};
use crate::domain::foundation::{Actor, ComplaintId, Role, UserId};
use crate::ports::{Collection, DocumentStore};

/// Command to create a complaint.
#[derive(Debug, Clone)]
pub struct CreateComplaintCommand {
    pub title: String,
    pub message: String,
    pub addressing: Addressing,
}

/// Handler for creating complaints.
pub struct CreateComplaintHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl CreateComplaintHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    /// Creates the complaint and returns its id.
    ///
    /// Validation, target resolution and authorization all happen before the
    /// single write, so a rejected request leaves no trace.
    pub async fn handle(
        &self,
        actor: &Actor,
        cmd: CreateComplaintCommand,
    ) -> Result<ComplaintId, ComplaintError> {
        let target = cmd.addressing.target().map_err(ComplaintError::denied)?;
        let complaint = Complaint::new(
            ComplaintId::generate(),
            actor,
            target.clone(),
            &cmd.title,
            &cmd.message,
        )?;

        let facts = self.resolve_target(actor, &target).await?;
        check(
            actor,
            &Operation::CreateComplaint {
                addressing: &cmd.addressing,
                facts,
            },
        )?;

        self.store
            .put(
                &Collection::Complaints,
                complaint.id.as_str(),
                complaint_document(&complaint)?,
                false,
            )
            .await?;

        tracing::info!(
            complaint_id = %complaint.id,
            sender_id = %actor.id,
            kind = complaint.target.kind().as_str(),
            "complaint created"
        );
        Ok(complaint.id)
    }

    /// Checks the target exists with the expected role and gathers the facts
    /// the gate needs about the sender's relationship to it.
    async fn resolve_target(
        &self,
        actor: &Actor,
        target: &ComplaintTarget,
    ) -> Result<AddressingFacts, ComplaintError> {
        let mut facts = AddressingFacts::default();
        match target {
            ComplaintTarget::Supervisor(id) => {
                self.expect_role(id, Role::Supervisor, "to_supervisor").await?;
                if actor.role == Role::Student {
                    facts.shares_group_with_supervisor =
                        self.directory.shares_group(&actor.id, id).await?;
                }
            }
            ComplaintTarget::Student(id) => {
                self.expect_role(id, Role::Student, "to_student").await?;
            }
            ComplaintTarget::Group(id) => {
                let members = self.directory.members_of(id).await?;
                facts.member_of_target_group = members.has_student(&actor.id);
            }
        }
        Ok(facts)
    }

    async fn expect_role(&self, id: &UserId, role: Role, field: &str) -> Result<(), ComplaintError> {
        let user = self.directory.get_user(id).await?;
        if user.role != role {
            return Err(ComplaintError::validation(
                field,
                format!("user {} is not a {}", id, role),
            ));
        }
        Ok(())
    }
}
