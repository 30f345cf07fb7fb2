//! Authorization module - role- and membership-aware capability checks.
//!
//! Consulted before every state-changing or disclosing operation.

mod gate;
mod reason;

pub use gate::{authorize, AddressingFacts, Operation};
pub use reason::{Decision, DenyReason};
