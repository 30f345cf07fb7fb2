//! HTTP adapter for admin endpoints: user management and activity recounts.

mod dto;
mod handlers;
mod routes;

pub use dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
pub use handlers::AdminHandlers;
pub use routes::admin_routes;
