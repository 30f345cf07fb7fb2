//! HTTP routes for admin endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{create_user, delete_user, list_users, recount_activity, update_user, AdminHandlers};

/// Creates the admin router.
///
/// - `GET /users` / `POST /users`
/// - `PUT /users/:id` / `DELETE /users/:id`
/// - `POST /activity/:day/recount`
pub fn admin_routes(handlers: AdminHandlers) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/activity/:day/recount", post(recount_activity))
        .with_state(handlers)
}
