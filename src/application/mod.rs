//! Application layer - Services, commands, queries and handlers.
//!
//! Orchestrates domain rules over the ports. Every write path resolves facts
//! through the membership directory, asks the authorization gate, and only
//! then touches the document store.

pub mod aggregator;
pub mod directory;
pub mod handlers;
pub mod records;
pub mod scheduler;

pub use aggregator::{DailyMessageAggregator, DEFAULT_SCAN_CONCURRENCY};
pub use directory::MembershipDirectory;
pub use scheduler::DailyAggregationScheduler;
