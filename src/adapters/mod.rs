//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Bearer token validation (JWT, mock)
//! - `document_store` - Document persistence (in-memory, PostgreSQL)
//! - `http` - axum REST API

pub mod auth;
pub mod document_store;
pub mod http;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use document_store::{InMemoryDocumentStore, PostgresDocumentStore};
pub use http::{api_router, with_server_layers};
