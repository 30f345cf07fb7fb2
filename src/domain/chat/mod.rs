//! Chat module - messages posted to a group's chat.
//!
//! Members of a group (its supervisor and students) post and read; admins
//! read. Posted messages are what the activity aggregator counts, so they are
//! never edited.

mod errors;
mod post;

pub use errors::ChatError;
pub use post::{ChatPost, MAX_MESSAGE_LENGTH};
