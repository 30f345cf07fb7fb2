//! CreateUserHandler - Admins register a user without a group.

use std::sync::Arc;

use super::{check_admin, ensure_email_free, normalize_email};
use crate::application::records::user_document;
use crate::domain::directory::{DirectoryError, User};
use crate::domain::foundation::{Actor, Role, UserId};
use crate::ports::{Collection, DocumentStore};

#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    /// Usually the identity provider's subject; generated when absent.
    pub id: Option<UserId>,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
}

pub struct CreateUserHandler {
    store: Arc<dyn DocumentStore>,
}

impl CreateUserHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Stores the user with no group pointer. Groups are joined through the
    /// group handlers or a later update.
    pub async fn handle(&self, actor: &Actor, cmd: CreateUserCommand) -> Result<User, DirectoryError> {
        check_admin(actor)?;
        let email = normalize_email(&cmd.email)?;
        let id = cmd.id.unwrap_or_else(UserId::generate);

        if self.store.get(&Collection::Users, id.as_str()).await?.is_some() {
            return Err(DirectoryError::UserExists(id.to_string()));
        }
        ensure_email_free(self.store.as_ref(), &email, None).await?;

        let user = User {
            id,
            email: Some(email),
            display_name: cmd
                .display_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            role: cmd.role,
            group_id: None,
        };
        self.store
            .put(&Collection::Users, user.id.as_str(), user_document(&user)?, false)
            .await?;

        tracing::info!(actor_id = %actor.id, user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::group::test_support::*;
    use crate::domain::authorization::DenyReason;

    fn cmd(id: Option<&str>, email: &str, role: Role) -> CreateUserCommand {
        CreateUserCommand {
            id: id.map(uid),
            email: email.to_string(),
            display_name: Some(" New Person ".to_string()),
            role,
        }
    }

    #[tokio::test]
    async fn admin_creates_user_without_group() {
        let store = workspace().await;
        let handler = CreateUserHandler::new(Arc::new(store.clone()));

        let user = handler
            .handle(&admin(), cmd(Some("U7"), "u7@school.test", Role::Student))
            .await
            .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("New Person"));

        let doc = store.get(&Collection::Users, "U7").await.unwrap().unwrap();
        let stored = User::try_from(&doc).unwrap();
        assert_eq!(stored, user);
        assert_eq!(stored.group_id, None);
    }

    #[tokio::test]
    async fn missing_id_is_generated() {
        let store = workspace().await;
        let handler = CreateUserHandler::new(Arc::new(store.clone()));

        let user = handler
            .handle(&admin(), cmd(None, "fresh@school.test", Role::Supervisor))
            .await
            .unwrap();
        assert!(store.get(&Collection::Users, user.id.as_str()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_id_or_email_is_refused() {
        let store = workspace().await;
        let handler = CreateUserHandler::new(Arc::new(store));

        assert_eq!(
            handler.handle(&admin(), cmd(Some("U1"), "other@school.test", Role::Student)).await,
            Err(DirectoryError::UserExists("U1".to_string()))
        );
        assert_eq!(
            handler.handle(&admin(), cmd(Some("U8"), " u1@school.test", Role::Student)).await,
            Err(DirectoryError::UserExists("u1@school.test".to_string()))
        );
    }

    #[tokio::test]
    async fn only_admin_creates_users() {
        let store = workspace().await;
        let handler = CreateUserHandler::new(Arc::new(store));
        let supervisor = Actor::new(uid("S1"), Role::Supervisor);

        assert_eq!(
            handler.handle(&supervisor, cmd(Some("U8"), "u8@school.test", Role::Student)).await,
            Err(DirectoryError::Forbidden(DenyReason::WrongRole))
        );
    }
}
