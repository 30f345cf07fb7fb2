//! HTTP handlers for complaint endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::{
    ComplaintView, CreateComplaintCommand, CreateComplaintHandler, DeleteComplaintCommand,
    DeleteComplaintHandler, ListComplaintsHandler, ListSupervisorsHandler, MarkReadCommand,
    MarkReadHandler, UpdateComplaintCommand, UpdateComplaintHandler,
};
use crate::domain::foundation::ComplaintId;
use crate::ports::DocumentStore;

use super::dto::{
    ComplaintResponse, CreateComplaintRequest, CreateComplaintResponse, MarkReadResponse,
    SupervisorResponse, UpdateComplaintRequest, UpdateComplaintResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ComplaintHandlers {
    create_handler: Arc<CreateComplaintHandler>,
    list_handler: Arc<ListComplaintsHandler>,
    supervisors_handler: Arc<ListSupervisorsHandler>,
    update_handler: Arc<UpdateComplaintHandler>,
    delete_handler: Arc<DeleteComplaintHandler>,
    mark_read_handler: Arc<MarkReadHandler>,
}

impl ComplaintHandlers {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            create_handler: Arc::new(CreateComplaintHandler::new(store.clone())),
            list_handler: Arc::new(ListComplaintsHandler::new(store.clone())),
            supervisors_handler: Arc::new(ListSupervisorsHandler::new(store.clone())),
            update_handler: Arc::new(UpdateComplaintHandler::new(store.clone())),
            delete_handler: Arc::new(DeleteComplaintHandler::new(store.clone())),
            mark_read_handler: Arc::new(MarkReadHandler::new(store)),
        }
    }
}

fn complaint_id(raw: String) -> Result<ComplaintId, ApiError> {
    ComplaintId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn listing(views: Vec<ComplaintView>) -> Json<Vec<ComplaintResponse>> {
    Json(views.into_iter().map(Into::into).collect())
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/complaints - File a complaint
pub async fn create_complaint(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
    Json(req): Json<CreateComplaintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let addressing = req
        .addressing()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let cmd = CreateComplaintCommand {
        title: req.title,
        message: req.message,
        addressing,
    };

    let id = handlers.create_handler.handle(&actor, cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateComplaintResponse { id: id.to_string() }),
    ))
}

/// GET /api/complaints/supervisor - Complaints addressed to the calling supervisor
pub async fn received_by_supervisor(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let views = handlers.list_handler.received_by_supervisor(&actor).await?;
    Ok(listing(views))
}

/// GET /api/complaints/student - Complaints addressed to the calling student
/// or to their groups
pub async fn received_by_student(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let views = handlers.list_handler.received_by_student(&actor).await?;
    Ok(listing(views))
}

/// GET /api/complaints/sent - Complaints the caller sent
pub async fn sent(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let views = handlers.list_handler.sent(&actor).await?;
    Ok(listing(views))
}

/// GET /api/complaints/professors - Supervisors of the calling student's groups
pub async fn my_supervisors(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let supervisors = handlers.supervisors_handler.handle(&actor).await?;
    let response: Vec<SupervisorResponse> = supervisors.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// PUT /api/complaints/:id - Edit title and message (sender only)
pub async fn update_complaint(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateComplaintRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = UpdateComplaintCommand {
        complaint_id: complaint_id(id)?,
        title: req.title,
        message: req.message,
    };
    let result = handlers.update_handler.handle(&actor, cmd).await?;
    Ok(Json(UpdateComplaintResponse {
        updated: result.updated,
    }))
}

/// DELETE /api/complaints/:id - Remove a complaint (sender only)
pub async fn delete_complaint(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteComplaintCommand {
        complaint_id: complaint_id(id)?,
    };
    handlers.delete_handler.handle(&actor, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/complaints/:id/read - Acknowledge a complaint
pub async fn mark_read(
    State(handlers): State<ComplaintHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = MarkReadCommand {
        complaint_id: complaint_id(id)?,
    };
    let outcome = handlers.mark_read_handler.handle(&actor, cmd).await?;
    Ok(Json(MarkReadResponse::from(outcome)))
}
