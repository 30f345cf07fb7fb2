//! Authentication adapters implementing `SessionValidator`.
//!
//! - `JwtSessionValidator` - HS256 bearer tokens
//! - `MockSessionValidator` - Fixed token table for tests and development

mod jwt;
mod mock;

pub use jwt::{Claims, JwtSessionValidator};
pub use mock::MockSessionValidator;
