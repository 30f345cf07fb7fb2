//! ListGroupsHandler - Groups visible to the caller, with member details.

use std::sync::Arc;

use crate::application::directory::MembershipDirectory;
use crate::domain::directory::{DirectoryError, Group, ProgressNote, User};
use crate::domain::foundation::{Actor, GroupId, Timestamp, UserId};
use crate::ports::DocumentStore;

/// A member as shown next to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
}

impl MemberView {
    fn resolve(id: &UserId, user: Option<User>) -> Self {
        match user {
            Some(user) => Self {
                id: id.clone(),
                name: user.label().to_string(),
                email: user.email,
            },
            None => Self {
                id: id.clone(),
                name: crate::domain::directory::UNKNOWN_USER_LABEL.to_string(),
                email: None,
            },
        }
    }
}

/// A group with its members resolved.
#[derive(Debug, Clone)]
pub struct GroupView {
    pub id: GroupId,
    pub name: String,
    pub project_title: Option<String>,
    pub supervisor: MemberView,
    pub students: Vec<MemberView>,
    pub progress: u8,
    pub notes: Vec<ProgressNote>,
    pub created_at: Option<Timestamp>,
}

pub struct ListGroupsHandler {
    directory: MembershipDirectory,
}

impl ListGroupsHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store),
        }
    }

    /// Groups visible to `actor`, sorted by name.
    pub async fn handle(&self, actor: &Actor) -> Result<Vec<GroupView>, DirectoryError> {
        let mut groups = self.directory.groups_visible_to(actor).await?;
        groups.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));

        let mut views = Vec::with_capacity(groups.len());
        for group in groups {
            views.push(self.view(group).await?);
        }
        Ok(views)
    }

    async fn view(&self, group: Group) -> Result<GroupView, DirectoryError> {
        let supervisor = MemberView::resolve(
            group.supervisor_id(),
            self.directory.find_user(group.supervisor_id()).await?,
        );
        let mut students = Vec::with_capacity(group.student_ids().len());
        for id in group.student_ids() {
            students.push(MemberView::resolve(id, self.directory.find_user(id).await?));
        }

        Ok(GroupView {
            id: group.id().clone(),
            name: group.name().to_string(),
            project_title: group.project_title().map(str::to_string),
            supervisor,
            students,
            progress: group.progress().value(),
            notes: group.notes().iter().cloned().collect(),
            created_at: group.created_at().copied(),
        })
    }
}
