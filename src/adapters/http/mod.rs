//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own adapter (dto, handlers, routes). [`api_router`]
//! nests them under `/api` behind the bearer auth middleware;
//! [`with_server_layers`] adds tracing, CORS, request ids and timeouts.

pub mod admin;
pub mod chat;
pub mod complaint;
pub mod error;
pub mod group;
pub mod middleware;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::DailyMessageAggregator;
use crate::config::ServerConfig;
use crate::ports::{DocumentStore, SessionValidator};

pub use admin::{admin_routes, AdminHandlers};
pub use chat::{chat_routes, ChatHandlers};
pub use complaint::{complaint_routes, ComplaintHandlers};
pub use error::{ApiError, ErrorResponse};
pub use group::{group_routes, GroupHandlers};
pub use middleware::{auth_middleware, AuthRejection, AuthState, RequireAuth};

/// Builds the `/api` router with every feature and the auth middleware.
pub fn api_router(
    store: Arc<dyn DocumentStore>,
    validator: Arc<dyn SessionValidator>,
    aggregator: Arc<DailyMessageAggregator>,
) -> Router {
    Router::new()
        .nest("/api/groups", group_routes(GroupHandlers::new(store.clone())))
        .nest("/api/chat", chat_routes(ChatHandlers::new(store.clone())))
        .nest("/api/complaints", complaint_routes(ComplaintHandlers::new(store.clone())))
        .nest("/api/admin", admin_routes(AdminHandlers::new(store, aggregator)))
        .layer(axum::middleware::from_fn_with_state(validator, auth_middleware))
}

/// Wraps `router` with the transport layers configured for `server`.
pub fn with_server_layers(router: Router, server: &ServerConfig) -> Router {
    let router = router.layer(TimeoutLayer::new(server.request_timeout()));

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let router = if origins.is_empty() {
        router
    } else {
        router.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
