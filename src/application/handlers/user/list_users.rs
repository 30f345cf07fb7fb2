//! ListUsersHandler - Admins list every user record.

use std::sync::Arc;

use super::check_admin;
use crate::domain::directory::{DirectoryError, User};
use crate::domain::foundation::Actor;
use crate::ports::{Collection, DocumentStore};

pub struct ListUsersHandler {
    store: Arc<dyn DocumentStore>,
}

impl ListUsersHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Users ordered by id. Malformed records are logged and skipped.
    pub async fn handle(&self, actor: &Actor) -> Result<Vec<User>, DirectoryError> {
        check_admin(actor)?;
        let docs = self.store.query(&Collection::Users, &[]).await?;
        let mut users: Vec<User> = docs
            .iter()
            .filter_map(|doc| match User::try_from(doc) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(user_id = %doc.id, error = %e, "skipping malformed user record");
                    None
                }
            })
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::group::test_support::*;
    use crate::domain::authorization::DenyReason;
    use crate::domain::foundation::Role;

    #[tokio::test]
    async fn admin_lists_users_with_pointers() {
        let store = workspace().await;
        let users = ListUsersHandler::new(Arc::new(store)).handle(&admin()).await.unwrap();

        let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "S1", "S2", "U1", "U2", "U3", "U4"]);
        let u1 = users.iter().find(|u| u.id == uid("U1")).unwrap();
        assert_eq!(u1.group_id, Some(gid("G1")));
    }

    #[tokio::test]
    async fn non_admins_are_refused() {
        let store = workspace().await;
        let handler = ListUsersHandler::new(Arc::new(store));
        assert_eq!(
            handler.handle(&Actor::new(uid("S1"), Role::Supervisor)).await,
            Err(DirectoryError::Forbidden(DenyReason::WrongRole))
        );
    }
}
