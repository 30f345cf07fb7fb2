//! HTTP adapter for group lifecycle, notes and progress.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AddNoteRequest, CreateGroupRequest, GroupRecordResponse, GroupResponse, MemberResponse,
    MembersResponse, ProgressResponse, UpdateGroupRequest, UpdateNoteRequest,
    UpdateProgressRequest,
};
pub use handlers::GroupHandlers;
pub use routes::group_routes;
