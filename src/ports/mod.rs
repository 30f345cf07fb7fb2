//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DocumentStore` - Keyed JSON document persistence
//! - `SessionValidator` - Bearer token validation

mod document_store;
mod session_validator;

pub use document_store::{
    encode, Collection, Document, DocumentStore, Filter, StoreError, StoredDocument,
};
pub use session_validator::SessionValidator;
