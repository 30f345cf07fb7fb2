//! HTTP handlers for admin endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::{
    CreateUserCommand, CreateUserHandler, DeleteUserCommand, DeleteUserHandler, ListUsersHandler,
    Membership, UpdateUserCommand, UpdateUserHandler,
};
use crate::application::DailyMessageAggregator;
use crate::domain::authorization::{authorize, Operation};
use crate::domain::foundation::{GroupId, Role, UserId};
use crate::ports::DocumentStore;

use super::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};

#[derive(Clone)]
pub struct AdminHandlers {
    aggregator: Arc<DailyMessageAggregator>,
    list_users: Arc<ListUsersHandler>,
    create_user: Arc<CreateUserHandler>,
    update_user: Arc<UpdateUserHandler>,
    delete_user: Arc<DeleteUserHandler>,
}

impl AdminHandlers {
    pub fn new(store: Arc<dyn DocumentStore>, aggregator: Arc<DailyMessageAggregator>) -> Self {
        Self {
            aggregator,
            list_users: Arc::new(ListUsersHandler::new(store.clone())),
            create_user: Arc::new(CreateUserHandler::new(store.clone())),
            update_user: Arc::new(UpdateUserHandler::new(store.clone())),
            delete_user: Arc::new(DeleteUserHandler::new(store)),
        }
    }
}

fn user_id(raw: String) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn role(raw: &str) -> Result<Role, ApiError> {
    raw.parse::<Role>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET /api/admin/users - Every user, ordered by id
pub async fn list_users(
    State(handlers): State<AdminHandlers>,
    RequireAuth(actor): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let users = handlers.list_users.handle(&actor).await?;
    let response: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// POST /api/admin/users - Register a user with no group
pub async fn create_user(
    State(handlers): State<AdminHandlers>,
    RequireAuth(actor): RequireAuth,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateUserCommand {
        id: req.id.map(user_id).transpose()?,
        email: req.email,
        display_name: req.display_name,
        role: req.role.as_deref().map(role).transpose()?.unwrap_or(Role::Student),
    };
    let user = handlers.create_user.handle(&actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PUT /api/admin/users/:id - Edit a profile, role or group membership
pub async fn update_user(
    State(handlers): State<AdminHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = match req.group_id {
        None => None,
        Some(None) => Some(Membership::Leave),
        Some(Some(raw)) => Some(Membership::Join(
            GroupId::new(raw).map_err(|e| ApiError::bad_request(e.to_string()))?,
        )),
    };
    let cmd = UpdateUserCommand {
        user_id: user_id(id)?,
        email: req.email,
        display_name: req.display_name,
        role: req.role.as_deref().map(role).transpose()?,
        membership,
    };
    let user = handlers.update_user.handle(&actor, cmd).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(handlers): State<AdminHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = DeleteUserCommand { user_id: user_id(id)? };
    handlers.delete_user.handle(&actor, cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/activity/:day/recount - Recount one UTC day's chat activity
///
/// `day` is `YYYY-MM-DD`. Returns the aggregation report.
pub async fn recount_activity(
    State(handlers): State<AdminHandlers>,
    RequireAuth(actor): RequireAuth,
    Path(day): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&actor, &Operation::RecountActivity)
        .into_result()
        .map_err(ApiError::forbidden)?;

    let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("invalid day '{}', expected YYYY-MM-DD", day)))?;

    tracing::info!(actor_id = %actor.id, %day, "activity recount requested");
    let report = handlers.aggregator.run_once(day).await?;
    Ok(Json(report))
}
