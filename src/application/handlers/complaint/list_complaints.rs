//! ListComplaintsHandler - Inbox and outbox queries with derived status.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::application::directory::MembershipDirectory;
use crate::application::records::{FIELD_GROUP_ID, FIELD_SENDER_ID, FIELD_TO_STUDENT, FIELD_TO_SUPERVISOR};
use crate::domain::authorization::DenyReason;
use crate::domain::complaint::{Complaint, ComplaintError, ComplaintStatus, ComplaintTarget};
use crate::domain::directory::{GroupMembers, UNKNOWN_USER_LABEL};
use crate::domain::foundation::{Actor, ComplaintId, GroupId, Role, Timestamp, UserId};
use crate::ports::{Collection, DocumentStore, Filter};

/// A complaint as listed to one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintView {
    pub id: ComplaintId,
    pub title: String,
    pub message: String,
    pub target: ComplaintTarget,
    pub sender_id: UserId,
    pub sender_role: Role,
    pub sender_name: String,
    pub status: ComplaintStatus,
    pub read_by: Vec<UserId>,
    pub created_at: Timestamp,
}

/// Handler for the three complaint listings.
pub struct ListComplaintsHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl ListComplaintsHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    /// Complaints individually addressed to the calling supervisor.
    pub async fn received_by_supervisor(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ComplaintView>, ComplaintError> {
        require_role(actor, Role::Supervisor)?;
        let complaints = self
            .fetch(&[Filter::eq(FIELD_TO_SUPERVISOR, actor.id.as_str())])
            .await?;
        self.present(complaints, |c| c.status_for_viewer(&actor.id)).await
    }

    /// Complaints addressed to the calling student directly or to any group
    /// the student belongs to.
    pub async fn received_by_student(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ComplaintView>, ComplaintError> {
        require_role(actor, Role::Student)?;

        let mut by_id: BTreeMap<ComplaintId, Complaint> = BTreeMap::new();
        let direct = self
            .fetch(&[Filter::eq(FIELD_TO_STUDENT, actor.id.as_str())])
            .await?;
        by_id.extend(direct.into_iter().map(|c| (c.id.clone(), c)));

        for group in self.directory.groups_visible_to(actor).await? {
            let addressed = self
                .fetch(&[Filter::eq(FIELD_GROUP_ID, group.id().as_str())])
                .await?;
            by_id.extend(
                addressed
                    .into_iter()
                    .filter(|c| c.target.group() == Some(group.id()))
                    .map(|c| (c.id.clone(), c)),
            );
        }

        self.present(by_id.into_values().collect(), |c| {
            c.status_for_viewer(&actor.id)
        })
        .await
    }

    /// Complaints the caller authored, with status from the recipients' side.
    pub async fn sent(&self, actor: &Actor) -> Result<Vec<ComplaintView>, ComplaintError> {
        let complaints = self
            .fetch(&[Filter::eq(FIELD_SENDER_ID, actor.id.as_str())])
            .await?;

        let mut members: HashMap<GroupId, Option<GroupMembers>> = HashMap::new();
        for group_id in complaints.iter().filter_map(|c| c.target.group()) {
            if !members.contains_key(group_id) {
                let resolved = self
                    .directory
                    .find_group(group_id)
                    .await?
                    .map(|g| g.members());
                members.insert(group_id.clone(), resolved);
            }
        }

        self.present(complaints, |c| {
            let group = c
                .target
                .group()
                .and_then(|id| members.get(id))
                .and_then(Option::as_ref);
            c.status_for_sender(group)
        })
        .await
    }

    async fn fetch(&self, filters: &[Filter]) -> Result<Vec<Complaint>, ComplaintError> {
        let docs = self.store.query(&Collection::Complaints, filters).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| match Complaint::try_from(doc) {
                Ok(complaint) => Some(complaint),
                Err(e) => {
                    tracing::warn!(complaint_id = %doc.id, error = %e, "skipping malformed complaint");
                    None
                }
            })
            .collect())
    }

    /// Attaches status and sender name, newest first.
    async fn present<F>(
        &self,
        mut complaints: Vec<Complaint>,
        status: F,
    ) -> Result<Vec<ComplaintView>, ComplaintError>
    where
        F: Fn(&Complaint) -> ComplaintStatus,
    {
        complaints.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut names: HashMap<UserId, String> = HashMap::new();
        for sender in complaints.iter().map(|c| &c.sender_id) {
            if !names.contains_key(sender) {
                let name = self
                    .directory
                    .find_user(sender)
                    .await?
                    .map(|u| u.label().to_string())
                    .unwrap_or_else(|| UNKNOWN_USER_LABEL.to_string());
                names.insert(sender.clone(), name);
            }
        }

        Ok(complaints
            .into_iter()
            .map(|c| ComplaintView {
                status: status(&c),
                sender_name: names
                    .get(&c.sender_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER_LABEL.to_string()),
                read_by: c.read_by.iter().cloned().collect(),
                id: c.id,
                title: c.title,
                message: c.message,
                target: c.target,
                sender_id: c.sender_id,
                sender_role: c.sender_role,
                created_at: c.created_at,
            })
            .collect())
    }
}

fn require_role(actor: &Actor, role: Role) -> Result<(), ComplaintError> {
    if actor.role != role {
        tracing::info!(actor_id = %actor.id, role = %actor.role, "complaint listing denied");
        return Err(ComplaintError::Forbidden(DenyReason::WrongRole));
    }
    Ok(())
}
