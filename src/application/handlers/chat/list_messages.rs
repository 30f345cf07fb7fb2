//! ListMessagesHandler - Read a group's chat, oldest first.

use std::sync::Arc;

use super::check;
use crate::application::directory::MembershipDirectory;
use crate::application::records::chat_post;
use crate::domain::authorization::Operation;
use crate::domain::chat::{ChatError, ChatPost};
use crate::domain::foundation::{Actor, GroupId};
use crate::ports::{Collection, DocumentStore};

pub struct ListMessagesHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl ListMessagesHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    /// Messages posted by users, ordered by timestamp. Malformed documents
    /// and system messages are skipped.
    pub async fn handle(&self, actor: &Actor, group_id: &GroupId) -> Result<Vec<ChatPost>, ChatError> {
        let members = self.directory.members_of(group_id).await?;
        check(actor, &Operation::ReadGroupChat { members: &members })?;

        let docs = self
            .store
            .query(&Collection::ChatMessages(group_id.clone()), &[])
            .await?;
        let mut posts: Vec<ChatPost> = docs
            .iter()
            .filter_map(|doc| match chat_post(group_id, doc) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!(group_id = %group_id, error = %e, "skipping malformed chat message");
                    None
                }
            })
            .collect();
        posts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }
}
