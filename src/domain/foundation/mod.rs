//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, roles, timestamps and error types that form the
//! vocabulary of the GroupDesk domain.

mod auth;
mod errors;
mod ids;
mod role;
mod timestamp;

pub use auth::{Actor, AuthError};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ComplaintId, GroupId, MessageId, UserId};
pub use role::Role;
pub use timestamp::{DayWindow, Timestamp};
