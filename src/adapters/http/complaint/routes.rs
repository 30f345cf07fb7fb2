//! HTTP routes for complaint endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    create_complaint, delete_complaint, mark_read, my_supervisors, received_by_student,
    received_by_supervisor, sent, update_complaint, ComplaintHandlers,
};

/// Creates the complaint router.
pub fn complaint_routes(handlers: ComplaintHandlers) -> Router {
    Router::new()
        .route("/", post(create_complaint))
        .route("/supervisor", get(received_by_supervisor))
        .route("/student", get(received_by_student))
        .route("/sent", get(sent))
        .route("/professors", get(my_supervisors))
        .route("/:id", put(update_complaint).delete(delete_complaint))
        .route("/:id/read", put(mark_read))
        .with_state(handlers)
}
