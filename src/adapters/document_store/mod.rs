//! Document store adapters.
//!
//! - `InMemoryDocumentStore` - Development and test store
//! - `PostgresDocumentStore` - JSONB-backed persistent store

mod in_memory;
mod postgres;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
