//! HTTP handlers for group endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::directory::MembershipDirectory;
use crate::application::handlers::{
    AddNoteCommand, AddNoteHandler, CreateGroupCommand, CreateGroupHandler, DeleteGroupCommand,
    DeleteGroupHandler, DeleteNoteCommand, DeleteNoteHandler, ListGroupsHandler,
    UpdateGroupCommand, UpdateGroupHandler, UpdateNoteCommand, UpdateNoteHandler,
    UpdateProgressCommand, UpdateProgressHandler,
};
use crate::domain::foundation::{GroupId, UserId};
use crate::ports::DocumentStore;

use super::dto::{
    AddNoteRequest, CreateGroupRequest, GroupRecordResponse, GroupResponse, MembersResponse,
    ProgressResponse, UpdateGroupRequest, UpdateNoteRequest, UpdateProgressRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct GroupHandlers {
    list_handler: Arc<ListGroupsHandler>,
    create_handler: Arc<CreateGroupHandler>,
    update_handler: Arc<UpdateGroupHandler>,
    delete_handler: Arc<DeleteGroupHandler>,
    progress_handler: Arc<UpdateProgressHandler>,
    add_note_handler: Arc<AddNoteHandler>,
    update_note_handler: Arc<UpdateNoteHandler>,
    delete_note_handler: Arc<DeleteNoteHandler>,
    directory: MembershipDirectory,
}

impl GroupHandlers {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            list_handler: Arc::new(ListGroupsHandler::new(store.clone())),
            create_handler: Arc::new(CreateGroupHandler::new(store.clone())),
            update_handler: Arc::new(UpdateGroupHandler::new(store.clone())),
            delete_handler: Arc::new(DeleteGroupHandler::new(store.clone())),
            progress_handler: Arc::new(UpdateProgressHandler::new(store.clone())),
            add_note_handler: Arc::new(AddNoteHandler::new(store.clone())),
            update_note_handler: Arc::new(UpdateNoteHandler::new(store.clone())),
            delete_note_handler: Arc::new(DeleteNoteHandler::new(store.clone())),
            directory: MembershipDirectory::new(store),
        }
    }
}

fn group_id(raw: String) -> Result<GroupId, ApiError> {
    GroupId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn user_ids(raw: Vec<String>) -> Result<Vec<UserId>, ApiError> {
    raw.into_iter()
        .map(|id| UserId::new(id).map_err(|e| ApiError::bad_request(e.to_string())))
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/groups - Groups visible to the caller
pub async fn list_groups(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let groups = handlers.list_handler.handle(&actor).await?;
    let response: Vec<GroupResponse> = groups.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// POST /api/groups - Create a group (admin)
pub async fn create_group(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateGroupCommand {
        name: req.name,
        supervisor_id: UserId::new(req.supervisor_id)
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        student_ids: user_ids(req.student_ids)?,
        project_title: req.project_title,
    };

    let group = handlers.create_handler.handle(&actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(GroupRecordResponse::from(&group))))
}

/// PUT /api/groups/:id - Update a group (admin)
pub async fn update_group(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let supervisor_id = req
        .supervisor_id
        .map(UserId::new)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let student_ids = req.student_ids.map(user_ids).transpose()?;

    let cmd = UpdateGroupCommand {
        group_id: Some(group_id(id)?),
        name: req.name,
        project_title: req.project_title,
        supervisor_id,
        student_ids,
    };

    let group = handlers.update_handler.handle(&actor, cmd).await?;
    Ok(Json(GroupRecordResponse::from(&group)))
}

/// DELETE /api/groups/:id - Delete a group (admin)
pub async fn delete_group(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteGroupCommand {
        group_id: group_id(id)?,
    };
    handlers.delete_handler.handle(&actor, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/groups/:id/members - Supervisor and student ids
pub async fn get_members(
    State(handlers): State<GroupHandlers>,
    RequireAuth(_actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let members = handlers.directory.members_of(&group_id(id)?).await?;
    Ok(Json(MembersResponse::from(members)))
}

/// PUT /api/groups/:id/progress - Set the progress percentage
pub async fn update_progress(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateProgressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = UpdateProgressCommand {
        group_id: group_id(id)?,
        progress: req.progress,
    };
    let progress = handlers.progress_handler.handle(&actor, cmd).await?;
    Ok(Json(ProgressResponse {
        progress: progress.value(),
    }))
}

/// POST /api/groups/:id/notes - Append a progress note
pub async fn add_note(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<AddNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = AddNoteCommand {
        group_id: group_id(id)?,
        timestamp: req.timestamp,
        text: req.text,
    };
    let note = handlers.add_note_handler.handle(&actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /api/groups/:id/notes/:timestamp - Replace a note's text
pub async fn update_note(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Path((id, timestamp)): Path<(String, String)>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = UpdateNoteCommand {
        group_id: group_id(id)?,
        timestamp,
        text: req.text,
    };
    let note = handlers.update_note_handler.handle(&actor, cmd).await?;
    Ok(Json(note))
}

/// DELETE /api/groups/:id/notes/:timestamp - Remove a note
pub async fn delete_note(
    State(handlers): State<GroupHandlers>,
    RequireAuth(actor): RequireAuth,
    Path((id, timestamp)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteNoteCommand {
        group_id: group_id(id)?,
        timestamp,
    };
    handlers.delete_note_handler.handle(&actor, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}
