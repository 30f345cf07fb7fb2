//! Complaint addressing.

use serde::{Deserialize, Serialize};

use crate::domain::authorization::DenyReason;
use crate::domain::foundation::{GroupId, UserId};

/// The single recipient of a complaint. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ComplaintTarget {
    Supervisor(UserId),
    Student(UserId),
    Group(GroupId),
}

impl ComplaintTarget {
    pub fn kind(&self) -> AddressingKind {
        match self {
            ComplaintTarget::Supervisor(_) | ComplaintTarget::Student(_) => {
                AddressingKind::Individual
            }
            ComplaintTarget::Group(_) => AddressingKind::Group,
        }
    }

    /// The individual recipient, if individually addressed.
    pub fn recipient(&self) -> Option<&UserId> {
        match self {
            ComplaintTarget::Supervisor(id) | ComplaintTarget::Student(id) => Some(id),
            ComplaintTarget::Group(_) => None,
        }
    }

    pub fn group(&self) -> Option<&GroupId> {
        match self {
            ComplaintTarget::Group(id) => Some(id),
            _ => None,
        }
    }
}

/// Individual vs. group addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingKind {
    Individual,
    Group,
}

impl AddressingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressingKind::Individual => "individual",
            AddressingKind::Group => "group",
        }
    }
}

/// Recipient fields as supplied by a caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressing {
    pub to_supervisor: Option<UserId>,
    pub to_student: Option<UserId>,
    pub to_group: Option<GroupId>,
}

impl Addressing {
    /// Resolves to exactly one target.
    pub fn target(&self) -> Result<ComplaintTarget, DenyReason> {
        let mut targets = [
            self.to_supervisor.clone().map(ComplaintTarget::Supervisor),
            self.to_student.clone().map(ComplaintTarget::Student),
            self.to_group.clone().map(ComplaintTarget::Group),
        ]
        .into_iter()
        .flatten();

        match (targets.next(), targets.next()) {
            (None, _) => Err(DenyReason::NoTarget),
            (Some(target), None) => Ok(target),
            (Some(_), Some(_)) => Err(DenyReason::AmbiguousTarget),
        }
    }
}

impl From<ComplaintTarget> for Addressing {
    fn from(target: ComplaintTarget) -> Self {
        match target {
            ComplaintTarget::Supervisor(id) => Addressing {
                to_supervisor: Some(id),
                ..Addressing::default()
            },
            ComplaintTarget::Student(id) => Addressing {
                to_student: Some(id),
                ..Addressing::default()
            },
            ComplaintTarget::Group(id) => Addressing {
                to_group: Some(id),
                ..Addressing::default()
            },
        }
    }
}
