//! Complaint module - addressing, visibility and derived read status.

mod aggregate;
mod errors;
mod status;
mod target;

pub use aggregate::{Complaint, ReadBy};
pub use errors::ComplaintError;
pub use status::{ComplaintStatus, Visibility};
pub use target::{Addressing, AddressingKind, ComplaintTarget};
