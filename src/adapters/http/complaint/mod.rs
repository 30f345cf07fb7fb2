//! HTTP adapter for complaints and the "my professors" lookup.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ComplaintResponse, CreateComplaintRequest, CreateComplaintResponse, MarkReadResponse,
    SupervisorResponse, UpdateComplaintRequest, UpdateComplaintResponse,
};
pub use handlers::ComplaintHandlers;
pub use routes::complaint_routes;
