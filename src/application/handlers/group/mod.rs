//! Group lifecycle, note and progress handlers.

mod add_note;
mod create_group;
mod delete_group;
mod delete_note;
mod list_groups;
mod update_group;
mod update_note;
mod update_progress;

pub use add_note::{AddNoteCommand, AddNoteHandler};
pub use create_group::{CreateGroupCommand, CreateGroupHandler};
pub use delete_group::{DeleteGroupCommand, DeleteGroupHandler};
pub use delete_note::{DeleteNoteCommand, DeleteNoteHandler};
pub use list_groups::{GroupView, ListGroupsHandler, MemberView};
pub use update_group::{UpdateGroupCommand, UpdateGroupHandler};
pub use update_note::{UpdateNoteCommand, UpdateNoteHandler};
pub use update_progress::{UpdateProgressCommand, UpdateProgressHandler};

use crate::application::directory::MembershipDirectory;
use crate::application::records::{group_document, next_revision_document, revision_guard, FIELD_REVISION};
use crate::domain::authorization::{authorize, Operation};
use crate::domain::directory::{DirectoryError, Group, PointerUpdate, User};
use crate::domain::foundation::{Actor, GroupId, Role, UserId};
use crate::ports::{Collection, DocumentStore};

/// Attempts made when concurrent writers keep changing the same group.
pub const DEFAULT_GROUP_WRITE_ATTEMPTS: u32 = 5;

fn check(actor: &Actor, operation: &Operation<'_>) -> Result<(), DirectoryError> {
    authorize(actor, operation)
        .into_result()
        .map_err(DirectoryError::forbidden)
}

/// Fails unless `user_id` exists and holds `role`.
async fn ensure_role(
    directory: &MembershipDirectory,
    user_id: &UserId,
    role: Role,
    field: &str,
) -> Result<User, DirectoryError> {
    let user = directory.get_user(user_id).await?;
    if user.role != role {
        return Err(DirectoryError::validation(
            field,
            format!("user {} is a {}, expected a {}", user_id, user.role, role),
        ));
    }
    Ok(user)
}

/// Fails unless `user_id` holds `role` and belongs to no group other than
/// `joining`.
pub(crate) async fn ensure_candidate(
    directory: &MembershipDirectory,
    user_id: &UserId,
    role: Role,
    field: &str,
    joining: Option<&GroupId>,
) -> Result<User, DirectoryError> {
    let user = ensure_role(directory, user_id, role, field).await?;
    directory.ensure_free_to_join(&user, joining).await?;
    Ok(user)
}

/// Writes a brand-new group record.
async fn insert_group(store: &dyn DocumentStore, group: &Group) -> Result<(), DirectoryError> {
    store
        .put(
            &Collection::Groups,
            group.id().as_str(),
            group_document(group)?,
            false,
        )
        .await?;
    Ok(())
}

/// Reads the group, applies `change`, and writes it back only if no other
/// writer committed in between. A lost race re-reads and reapplies `change`,
/// so authorization inside it always sees the current members.
pub(crate) async fn mutate_group<T>(
    directory: &MembershipDirectory,
    store: &dyn DocumentStore,
    group_id: &GroupId,
    max_attempts: u32,
    mut change: impl FnMut(&mut Group) -> Result<T, DirectoryError>,
) -> Result<(Group, T), DirectoryError> {
    let max_attempts = max_attempts.max(1);
    for attempt in 1..=max_attempts {
        let mut group = directory.get_group(group_id).await?;
        let outcome = change(&mut group)?;

        let committed = store
            .merge_if(
                &Collection::Groups,
                group_id.as_str(),
                FIELD_REVISION,
                &revision_guard(group.revision()),
                next_revision_document(&group)?,
            )
            .await;
        match committed {
            Ok(true) => return Ok((group, outcome)),
            Ok(false) => {}
            Err(e) if e.is_conflict() => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(group_id = %group_id, attempt, "group changed concurrently, retrying");
    }

    tracing::warn!(
        group_id = %group_id,
        attempts = max_attempts,
        "giving up on group write after repeated conflicts"
    );
    Err(DirectoryError::ConcurrentModification(group_id.clone()))
}

/// Applies pointer writes after the group record changed, logging a
/// half-applied update with the group id.
pub(crate) async fn sync_pointers(
    directory: &MembershipDirectory,
    group_id: &GroupId,
    updates: &[PointerUpdate],
) -> Result<(), DirectoryError> {
    directory.apply(group_id, updates).await.map_err(|e| {
        tracing::error!(
            group_id = %group_id,
            pending = updates.len(),
            error = %e,
            "group record written but member pointers are out of step"
        );
        e
    })
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::test_support::*;
    use crate::application::MembershipDirectory;
    use crate::ports::DocumentStore;

    #[tokio::test]
    async fn workspace_links_both_sides_of_every_membership() {
        let store = workspace().await;
        let directory = MembershipDirectory::new(Arc::new(store) as Arc<dyn DocumentStore>);

        for member in ["S1", "U1", "U2"] {
            assert_eq!(directory.group_of(&uid(member)).await.unwrap(), Some(gid("G1")));
        }
        for outsider in ["S2", "U3", "U4", "A1"] {
            assert_eq!(directory.group_of(&uid(outsider)).await.unwrap(), None);
        }
    }
}
