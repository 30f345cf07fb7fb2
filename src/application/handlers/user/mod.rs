//! Admin user management handlers.
//!
//! Membership changes made here go through the same group writes and pointer
//! rules as the group handlers, so a user still belongs to at most one group.

mod create_user;
mod delete_user;
mod list_users;
mod update_user;

pub use create_user::{CreateUserCommand, CreateUserHandler};
pub use delete_user::{DeleteUserCommand, DeleteUserHandler};
pub use list_users::ListUsersHandler;
pub use update_user::{Membership, UpdateUserCommand, UpdateUserHandler};

use crate::application::records::FIELD_EMAIL;
use crate::domain::authorization::{authorize, Operation};
use crate::domain::directory::DirectoryError;
use crate::domain::foundation::{Actor, UserId};
use crate::ports::{Collection, DocumentStore, Filter};

fn check_admin(actor: &Actor) -> Result<(), DirectoryError> {
    authorize(actor, &Operation::ManageUsers)
        .into_result()
        .map_err(DirectoryError::forbidden)
}

/// Trimmed email, rejected unless it looks like `local@domain`.
fn normalize_email(email: &str) -> Result<String, DirectoryError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DirectoryError::validation("email", "email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email.to_string()),
        _ => Err(DirectoryError::validation("email", format!("'{}' is not an email address", email))),
    }
}

/// Fails with `UserExists` when a user other than `except` holds `email`.
async fn ensure_email_free(
    store: &dyn DocumentStore,
    email: &str,
    except: Option<&UserId>,
) -> Result<(), DirectoryError> {
    let holders = store
        .query(&Collection::Users, &[Filter::eq(FIELD_EMAIL, email)])
        .await?;
    if holders.iter().any(|doc| Some(doc.id.as_str()) != except.map(UserId::as_str)) {
        return Err(DirectoryError::UserExists(email.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_must_have_both_parts() {
        assert_eq!(normalize_email(" a@b.org ").unwrap(), "a@b.org");
        for bad in ["", "   ", "ab.org", "@b.org", "a@"] {
            assert!(normalize_email(bad).is_err(), "{}", bad);
        }
    }
}
