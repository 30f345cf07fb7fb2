//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, roles, timestamps, errors)
//! - `directory` - Users, groups, notes and membership links
//! - `authorization` - The pure authorization gate
//! - `complaint` - Complaint addressing, visibility and read status
//! - `chat` - Group chat messages
//! - `activity` - Daily chat message counts

pub mod activity;
pub mod authorization;
pub mod chat;
pub mod complaint;
pub mod directory;
pub mod foundation;
