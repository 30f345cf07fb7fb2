//! Chat messages and the per-day tally.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{DayWindow, GroupId, Timestamp, UserId};

/// A chat message as read from a group's message log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub group_id: GroupId,
    /// Missing on system messages.
    pub sender_id: Option<UserId>,
    pub timestamp: Timestamp,
    pub content: String,
}

/// Number of messages one user sent in one group on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMessageCount {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub day: NaiveDate,
    pub count: u64,
}

impl DailyMessageCount {
    /// Deterministic document id, so recounting a day overwrites its rows.
    ///
    /// Ids are joined with `_`; any `%` or `_` inside an id is
    /// percent-encoded so distinct (user, group) pairs never share a key.
    pub fn document_id(&self) -> String {
        format!(
            "{}_{}_{}",
            escape_key_part(self.user_id.as_str()),
            escape_key_part(self.group_id.as_str()),
            self.day.format("%Y-%m-%d")
        )
    }
}

fn escape_key_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '_' => escaped.push_str("%5F"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Counts messages inside `window` per sender.
///
/// Messages outside the window, from another group, or without a sender are
/// ignored. Rows come out ordered by user id.
pub fn tally<'a>(
    group_id: &GroupId,
    window: &DayWindow,
    messages: impl IntoIterator<Item = &'a ChatMessage>,
) -> Vec<DailyMessageCount> {
    let mut counts: BTreeMap<&UserId, u64> = BTreeMap::new();
    for message in messages {
        if &message.group_id != group_id || !window.contains(&message.timestamp) {
            continue;
        }
        if let Some(sender) = &message.sender_id {
            *counts.entry(sender).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .map(|(user_id, count)| DailyMessageCount {
            user_id: user_id.clone(),
            group_id: group_id.clone(),
            day: window.day(),
            count,
        })
        .collect()
}
