//! HTTP adapter for group chat.

mod dto;
mod handlers;
mod routes;

pub use dto::{MessageResponse, PostMessageRequest};
pub use handlers::ChatHandlers;
pub use routes::chat_routes;
