//! Group chat handlers.
//!
//! Messages are immutable once posted: the activity aggregator counts them.

mod list_messages;
mod post_message;

pub use list_messages::ListMessagesHandler;
pub use post_message::{PostMessageCommand, PostMessageHandler};

use crate::domain::authorization::{authorize, Operation};
use crate::domain::chat::ChatError;
use crate::domain::directory::DirectoryError;
use crate::domain::foundation::Actor;
use crate::ports::StoreError;

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::infrastructure(err.to_string())
    }
}

impl From<DirectoryError> for ChatError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::GroupNotFound(id) => ChatError::GroupNotFound(id),
            DirectoryError::Forbidden(reason) => ChatError::Forbidden(reason),
            DirectoryError::ValidationFailed { field, message } => {
                ChatError::ValidationFailed { field, message }
            }
            other => ChatError::infrastructure(other.message()),
        }
    }
}

fn check(actor: &Actor, operation: &Operation<'_>) -> Result<(), ChatError> {
    authorize(actor, operation)
        .into_result()
        .map_err(ChatError::Forbidden)
}

#[cfg(test)]
pub(crate) mod test_support {
    pub use crate::application::handlers::group::test_support::*;

    use std::sync::Arc;

    use crate::adapters::document_store::InMemoryDocumentStore;
    use crate::domain::chat::ChatPost;
    use crate::domain::foundation::{Actor, Role};

    use super::{PostMessageCommand, PostMessageHandler};

    pub fn student(id: &str) -> Actor {
        Actor::new(uid(id), Role::Student)
    }

    pub fn supervisor(id: &str) -> Actor {
        Actor::new(uid(id), Role::Supervisor)
    }

    pub async fn post(store: &InMemoryDocumentStore, actor: &Actor, group: &str, text: &str) -> ChatPost {
        PostMessageHandler::new(Arc::new(store.clone()))
            .handle(
                actor,
                PostMessageCommand {
                    group_id: gid(group),
                    text: text.to_string(),
                },
            )
            .await
            .unwrap()
    }
}
