//! Derived complaint read status and viewer visibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read status of a complaint from one perspective. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintStatus {
    Unread,
    Open,
}

impl ComplaintStatus {
    pub fn from_open(open: bool) -> Self {
        if open {
            ComplaintStatus::Open
        } else {
            ComplaintStatus::Unread
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ComplaintStatus::Open)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplaintStatus::Unread => write!(f, "unread"),
            ComplaintStatus::Open => write!(f, "open"),
        }
    }
}

/// How a viewer relates to a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Sender,
    /// The individual recipient.
    Recipient,
    /// A current student member of the addressed group.
    GroupMember,
    Hidden,
}

impl Visibility {
    pub fn can_view(&self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ComplaintStatus::Open).unwrap(), "\"open\"");
        assert_eq!(ComplaintStatus::Unread.to_string(), "unread");
    }

    #[test]
    fn hidden_is_the_only_invisible_relation() {
        assert!(Visibility::Sender.can_view());
        assert!(Visibility::Recipient.can_view());
        assert!(Visibility::GroupMember.can_view());
        assert!(!Visibility::Hidden.can_view());
    }
}
