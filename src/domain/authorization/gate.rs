//! The authorization gate.
//!
//! `authorize` is a pure function: every fact a rule needs (group members,
//! shared-group checks, complaint visibility) is resolved by the caller through
//! the membership directory and passed in with the [`Operation`]. Role matching
//! is exhaustive, so adding a role forces every rule to be revisited.

use super::reason::{Decision, DenyReason};
use crate::domain::complaint::{Addressing, ComplaintTarget, Visibility};
use crate::domain::directory::GroupMembers;
use crate::domain::foundation::{Actor, Role, UserId};

/// Facts about the sender's relationship to a complaint target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressingFacts {
    /// The sender shares a group with the addressed supervisor.
    pub shares_group_with_supervisor: bool,
    /// The sender is a current student member of the addressed group.
    pub member_of_target_group: bool,
}

/// An operation submitted to the gate, with its resolved target facts.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Create, update or delete a group.
    MutateGroup,
    /// Add, update or delete a progress note.
    EditGroupNotes { members: &'a GroupMembers },
    /// Change a group's progress percentage.
    UpdateGroupProgress { members: &'a GroupMembers },
    CreateComplaint {
        addressing: &'a Addressing,
        facts: AddressingFacts,
    },
    /// Update or delete a complaint.
    MutateComplaint { sender: &'a UserId },
    MarkComplaintRead { visibility: Visibility },
    /// Recount a day's chat activity on demand.
    RecountActivity,
    /// List, create, update or delete user records.
    ManageUsers,
    ReadGroupChat { members: &'a GroupMembers },
    PostGroupChat { members: &'a GroupMembers },
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::MutateGroup => "mutate_group",
            Operation::EditGroupNotes { .. } => "edit_group_notes",
            Operation::UpdateGroupProgress { .. } => "update_group_progress",
            Operation::CreateComplaint { .. } => "create_complaint",
            Operation::MutateComplaint { .. } => "mutate_complaint",
            Operation::MarkComplaintRead { .. } => "mark_complaint_read",
            Operation::RecountActivity => "recount_activity",
            Operation::ManageUsers => "manage_users",
            Operation::ReadGroupChat { .. } => "read_group_chat",
            Operation::PostGroupChat { .. } => "post_group_chat",
        }
    }
}

/// Decide whether `actor` may perform `operation`.
pub fn authorize(actor: &Actor, operation: &Operation<'_>) -> Decision {
    let decision = Decision::from(evaluate(actor, operation));
    match decision {
        Decision::Allow => tracing::debug!(
            actor_id = %actor.id,
            role = %actor.role,
            operation = operation.name(),
            "authorization allowed"
        ),
        Decision::Deny(reason) => tracing::info!(
            actor_id = %actor.id,
            role = %actor.role,
            operation = operation.name(),
            reason = reason.code(),
            "authorization denied"
        ),
    }
    decision
}

fn evaluate(actor: &Actor, operation: &Operation<'_>) -> Result<(), DenyReason> {
    match operation {
        Operation::MutateGroup | Operation::RecountActivity | Operation::ManageUsers => {
            match actor.role {
                Role::Admin => Ok(()),
                Role::Supervisor | Role::Student => Err(DenyReason::WrongRole),
            }
        }

        Operation::EditGroupNotes { members } => match actor.role {
            Role::Student if members.has_student(&actor.id) => Ok(()),
            Role::Student => Err(DenyReason::NotMember),
            Role::Admin | Role::Supervisor => Err(DenyReason::WrongRole),
        },

        Operation::UpdateGroupProgress { members } => match actor.role {
            Role::Admin => Ok(()),
            Role::Supervisor if members.is_supervisor(&actor.id) => Ok(()),
            Role::Student if members.has_student(&actor.id) => Ok(()),
            Role::Supervisor | Role::Student => Err(DenyReason::NotMember),
        },

        Operation::CreateComplaint { addressing, facts } => {
            let target = addressing.target()?;
            match (actor.role, &target) {
                (Role::Admin, _) => Err(DenyReason::WrongRole),
                (Role::Student, ComplaintTarget::Supervisor(_)) => {
                    if facts.shares_group_with_supervisor {
                        Ok(())
                    } else {
                        Err(DenyReason::NoSharedGroup)
                    }
                }
                (Role::Student, ComplaintTarget::Group(_)) => {
                    if facts.member_of_target_group {
                        Ok(())
                    } else {
                        Err(DenyReason::NotMember)
                    }
                }
                (Role::Student, ComplaintTarget::Student(_)) => Err(DenyReason::WrongRole),
                (Role::Supervisor, ComplaintTarget::Supervisor(_)) => Err(DenyReason::WrongRole),
                (Role::Supervisor, ComplaintTarget::Student(_) | ComplaintTarget::Group(_)) => {
                    Ok(())
                }
            }
        }

        Operation::ReadGroupChat { members } => match actor.role {
            Role::Admin => Ok(()),
            Role::Supervisor if members.is_supervisor(&actor.id) => Ok(()),
            Role::Student if members.has_student(&actor.id) => Ok(()),
            Role::Supervisor | Role::Student => Err(DenyReason::NotMember),
        },

        Operation::PostGroupChat { members } => match actor.role {
            Role::Supervisor if members.is_supervisor(&actor.id) => Ok(()),
            Role::Student if members.has_student(&actor.id) => Ok(()),
            Role::Supervisor | Role::Student => Err(DenyReason::NotMember),
            Role::Admin => Err(DenyReason::WrongRole),
        },

        Operation::MutateComplaint { sender } => {
            if *sender == &actor.id {
                Ok(())
            } else {
                Err(DenyReason::NotSender)
            }
        }

        Operation::MarkComplaintRead { visibility } => {
            if visibility.can_view() {
                Ok(())
            } else {
                Err(DenyReason::NotRecipient)
            }
        }
    }
}
