//! Directory module - users, groups and their bidirectional membership links.
//!
//! Each student and supervisor carries a pointer to the group they belong to,
//! and each group lists its supervisor and student members. Both sides are kept
//! consistent by the group lifecycle operations.

mod errors;
mod group;
mod notes;
mod progress;
mod user;

pub use errors::DirectoryError;
pub use group::{Group, GroupMembers, PointerUpdate, MAX_NAME_LENGTH};
pub use notes::{NoteError, NoteKey, NoteLog, ProgressNote};
pub use progress::Progress;
pub use user::{User, UNKNOWN_USER_LABEL};
