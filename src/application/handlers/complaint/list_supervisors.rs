//! ListSupervisorsHandler - The supervisors a student may write to.

use std::sync::Arc;

use crate::application::directory::MembershipDirectory;
use crate::domain::authorization::DenyReason;
use crate::domain::complaint::ComplaintError;
use crate::domain::directory::User;
use crate::domain::foundation::{Actor, Role};
use crate::ports::DocumentStore;

pub struct ListSupervisorsHandler {
    directory: MembershipDirectory,
}

impl ListSupervisorsHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store),
        }
    }

    /// Supervisors of the calling student's groups, sorted by id.
    pub async fn handle(&self, actor: &Actor) -> Result<Vec<User>, ComplaintError> {
        if actor.role != Role::Student {
            return Err(ComplaintError::Forbidden(DenyReason::WrongRole));
        }
        Ok(self.directory.supervisors_of(&actor.id).await?)
    }
}
