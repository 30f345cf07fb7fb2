//! Activity module - daily per-user chat message counts.
//!
//! Chat messages are owned by the chat feature; this module only reads them
//! and produces one [`DailyMessageCount`] per (sender, group, day).

mod count;
mod report;

pub use count::{tally, ChatMessage, DailyMessageCount};
pub use report::{AggregationReport, GroupFailure};
