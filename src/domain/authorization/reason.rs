//! Deny reasons and gate decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the gate rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// The actor is not a current member of the group involved.
    NotMember,
    /// A student addressed a supervisor they share no group with.
    NoSharedGroup,
    /// The actor's role may not perform this operation.
    WrongRole,
    /// More than one complaint target was supplied.
    AmbiguousTarget,
    /// No complaint target was supplied.
    NoTarget,
    /// Only the complaint's sender may change it.
    NotSender,
    /// The actor cannot view the complaint.
    NotRecipient,
}

impl DenyReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::NotMember => "NOT_MEMBER",
            DenyReason::NoSharedGroup => "NO_SHARED_GROUP",
            DenyReason::WrongRole => "WRONG_ROLE",
            DenyReason::AmbiguousTarget => "AMBIGUOUS_TARGET",
            DenyReason::NoTarget => "NO_TARGET",
            DenyReason::NotSender => "NOT_SENDER",
            DenyReason::NotRecipient => "NOT_RECIPIENT",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            DenyReason::NotMember => "You are not a member of this group",
            DenyReason::NoSharedGroup => "You do not share a group with this supervisor",
            DenyReason::WrongRole => "Your role does not permit this operation",
            DenyReason::AmbiguousTarget => "Specify exactly one recipient",
            DenyReason::NoTarget => "A recipient is required",
            DenyReason::NotSender => "Only the sender can modify this complaint",
            DenyReason::NotRecipient => "You cannot view this complaint",
        }
    }

    /// True for reasons that describe a malformed request rather than a
    /// permission problem.
    pub fn is_addressing_error(&self) -> bool {
        matches!(self, DenyReason::AmbiguousTarget | DenyReason::NoTarget)
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Gate output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Converts into a `Result` so callers can use `?` with `map_err`.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

impl From<Result<(), DenyReason>> for Decision {
    fn from(result: Result<(), DenyReason>) -> Self {
        match result {
            Ok(()) => Decision::Allow,
            Err(reason) => Decision::Deny(reason),
        }
    }
}
