//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod chat;
pub mod complaint;
pub mod group;
pub mod user;

pub use chat::{ListMessagesHandler, PostMessageCommand, PostMessageHandler};
pub use complaint::{
    ComplaintView, CreateComplaintCommand, CreateComplaintHandler, DeleteComplaintCommand,
    DeleteComplaintHandler, ListComplaintsHandler, ListSupervisorsHandler, MarkReadCommand,
    MarkReadHandler, MarkReadOutcome, UpdateComplaintCommand, UpdateComplaintHandler,
    UpdateComplaintResult,
};
pub use group::{
    AddNoteCommand, AddNoteHandler, CreateGroupCommand, CreateGroupHandler, DeleteGroupCommand,
    DeleteGroupHandler, DeleteNoteCommand, DeleteNoteHandler, GroupView, ListGroupsHandler,
    MemberView, UpdateGroupCommand, UpdateGroupHandler, UpdateNoteCommand, UpdateNoteHandler,
    UpdateProgressCommand, UpdateProgressHandler,
};
pub use user::{
    CreateUserCommand, CreateUserHandler, DeleteUserCommand, DeleteUserHandler, ListUsersHandler,
    Membership, UpdateUserCommand, UpdateUserHandler,
};
