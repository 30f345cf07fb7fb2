//! HTTP routes for group endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    add_note, create_group, delete_group, delete_note, get_members, list_groups, update_group,
    update_note, update_progress, GroupHandlers,
};

/// Creates the group router.
///
/// - `GET /` / `POST /` - list visible groups, create (admin)
/// - `PUT /:id` / `DELETE /:id` - update, delete (admin)
/// - `GET /:id/members`
/// - `PUT /:id/progress`
/// - `POST /:id/notes`, `PUT|DELETE /:id/notes/:timestamp`
pub fn group_routes(handlers: GroupHandlers) -> Router {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/:id", put(update_group).delete(delete_group))
        .route("/:id/members", get(get_members))
        .route("/:id/progress", put(update_progress))
        .route("/:id/notes", post(add_note))
        .route("/:id/notes/:timestamp", put(update_note).delete(delete_note))
        .with_state(handlers)
}
