//! Shared fixtures for the HTTP integration tests.
//!
//! Builds the `/api` router over an in-memory store with a fixed token
//! table:
//!
//! | token | user | role |
//! |-------|------|------|
//! | `admin` | A1 | admin |
//! | `s1`, `s2` | S1, S2 | supervisor |
//! | `u1` .. `u4` | U1 .. U4 | student |

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use groupdesk::adapters::http::api_router;
use groupdesk::adapters::{InMemoryDocumentStore, MockSessionValidator};
use groupdesk::application::records::user_document;
use groupdesk::application::DailyMessageAggregator;
use groupdesk::domain::directory::User;
use groupdesk::domain::foundation::{Role, UserId};
use groupdesk::ports::{Collection, DocumentStore};

pub struct TestApp {
    pub store: InMemoryDocumentStore,
    pub router: Router,
}

const USERS: &[(&str, &str, Role)] = &[
    ("admin", "A1", Role::Admin),
    ("s1", "S1", Role::Supervisor),
    ("s2", "S2", Role::Supervisor),
    ("u1", "U1", Role::Student),
    ("u2", "U2", Role::Student),
    ("u3", "U3", Role::Student),
    ("u4", "U4", Role::Student),
];

impl TestApp {
    pub async fn new() -> Self {
        let store = InMemoryDocumentStore::new();
        let mut validator = MockSessionValidator::new();

        for (token, id, role) in USERS {
            let user = User {
                id: UserId::new(*id).unwrap(),
                email: Some(format!("{}@example.edu", id.to_lowercase())),
                display_name: Some(format!("User {}", id)),
                role: *role,
                group_id: None,
            };
            store
                .put(&Collection::Users, id, user_document(&user).unwrap(), false)
                .await
                .unwrap();
            validator = validator.with_actor(*token, id, *role);
        }

        let shared: Arc<dyn DocumentStore> = Arc::new(store.clone());
        let aggregator = Arc::new(DailyMessageAggregator::new(shared.clone()));
        let router = api_router(shared, Arc::new(validator), aggregator);
        Self { store, router }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Creates a group as admin and returns its id.
    pub async fn create_group(&self, name: &str, supervisor: &str, students: &[&str]) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/groups",
                Some("admin"),
                Some(serde_json::json!({
                    "name": name,
                    "supervisor_id": supervisor,
                    "student_ids": students,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn user_group(&self, user_id: &str) -> Value {
        let doc = self
            .store
            .get(&Collection::Users, user_id)
            .await
            .unwrap()
            .unwrap();
        doc.body.get("groupId").cloned().unwrap_or(Value::Null)
    }
}
