//! PostMessageHandler - A group's supervisor or student posts to its chat.

use std::sync::Arc;

use super::check;
use crate::application::directory::MembershipDirectory;
use crate::application::records::chat_post_document;
use crate::domain::authorization::Operation;
use crate::domain::chat::{ChatError, ChatPost};
use crate::domain::foundation::{Actor, GroupId, Timestamp};
use crate::ports::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct PostMessageCommand {
    pub group_id: GroupId,
    pub text: String,
}

pub struct PostMessageHandler {
    store: Arc<dyn DocumentStore>,
    directory: MembershipDirectory,
}

impl PostMessageHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: MembershipDirectory::new(store.clone()),
            store,
        }
    }

    pub async fn handle(&self, actor: &Actor, cmd: PostMessageCommand) -> Result<ChatPost, ChatError> {
        let members = self.directory.members_of(&cmd.group_id).await?;
        check(actor, &Operation::PostGroupChat { members: &members })?;

        let post = ChatPost::new(cmd.group_id, actor, cmd.text, Timestamp::now())?;
        self.store
            .put(
                &Collection::ChatMessages(post.group_id.clone()),
                post.id.as_str(),
                chat_post_document(&post)?,
                false,
            )
            .await?;

        tracing::debug!(group_id = %post.group_id, message_id = %post.id, "chat message posted");
        Ok(post)
    }
}
