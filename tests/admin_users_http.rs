//! Admin user management over HTTP, including group membership changes.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn admin_creates_lists_and_deletes_a_user() {
    let app = TestApp::new().await;

    let (status, created) = app
        .call(
            "POST",
            "/api/admin/users",
            Some("admin"),
            Some(json!({"id": "U5", "email": "u5@example.edu", "displayName": "Five"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["role"], "student");
    assert_eq!(created["group_id"], serde_json::Value::Null);

    let (status, users) = app.call("GET", "/api/admin/users", Some("admin"), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"U5"));

    let (status, _) = app.call("DELETE", "/api/admin/users/U5", Some("admin"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("DELETE", "/api/admin/users/U5", Some("admin"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            "POST",
            "/api/admin/users",
            Some("admin"),
            Some(json!({"email": "u1@example.edu", "role": "student"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let app = TestApp::new().await;
    for token in ["s1", "u1"] {
        let (status, body) = app.call("GET", "/api/admin/users", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "WRONG_ROLE");
    }
}

#[tokio::test]
async fn membership_moves_keep_both_sides_in_step() {
    let app = TestApp::new().await;
    let first = app.create_group("First", "S1", &["U1"]).await;
    let second = app.create_group("Second", "S2", &["U2"]).await;

    // Joining a second group is refused while the first still lists the user.
    let (status, _) = app
        .call("PUT", "/api/admin/users/U1", Some("admin"), Some(json!({"group_id": second})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, left) = app
        .call("PUT", "/api/admin/users/U1", Some("admin"), Some(json!({"group_id": null})))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", left);
    assert_eq!(app.user_group("U1").await, serde_json::Value::Null);

    let (status, joined) = app
        .call("PUT", "/api/admin/users/U1", Some("admin"), Some(json!({"group_id": second})))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", joined);
    assert_eq!(joined["group_id"], second.as_str());

    let (_, members) = app
        .call("GET", &format!("/api/groups/{}/members", second), Some("admin"), None)
        .await;
    let students = members["student_ids"].as_array().unwrap();
    assert!(students.contains(&json!("U1")));

    let (_, members) = app
        .call("GET", &format!("/api/groups/{}/members", first), Some("admin"), None)
        .await;
    assert!(members["student_ids"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_role_is_a_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call("PUT", "/api/admin/users/U3", Some("admin"), Some(json!({"role": "dean"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}
