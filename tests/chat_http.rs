//! Group chat over HTTP, and its messages feeding the activity recount.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;
use groupdesk::ports::{Collection, DocumentStore};

#[tokio::test]
async fn members_post_and_read_the_group_chat() {
    let app = TestApp::new().await;
    let group = app.create_group("Team", "S1", &["U1", "U2"]).await;
    let uri = format!("/api/chat/{}/messages", group);

    let (status, first) = app.call("POST", &uri, Some("u1"), Some(json!({"text": "hello"}))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    assert_eq!(first["sender_id"], "U1");
    assert_eq!(first["sender_role"], "student");

    let (status, _) = app.call("POST", &uri, Some("s1"), Some(json!({"text": "welcome"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    for token in ["u2", "s1", "admin"] {
        let (status, messages) = app.call("GET", &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        let texts: Vec<&str> = messages
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["hello", "welcome"]);
    }
}

#[tokio::test]
async fn outsiders_cannot_read_or_post() {
    let app = TestApp::new().await;
    let group = app.create_group("Team", "S1", &["U1"]).await;
    let uri = format!("/api/chat/{}/messages", group);

    for token in ["u3", "s2"] {
        let (status, body) = app.call("GET", &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["reason"], "NOT_MEMBER");

        let (status, _) = app.call("POST", &uri, Some(token), Some(json!({"text": "hi"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, body) = app.call("POST", &uri, Some("admin"), Some(json!({"text": "hi"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "WRONG_ROLE");

    let (status, _) = app.call("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn posted_messages_are_counted_by_the_recount() {
    let app = TestApp::new().await;
    let group = app.create_group("Team", "S1", &["U1"]).await;
    let uri = format!("/api/chat/{}/messages", group);
    let (_, posted) = app.call("POST", &uri, Some("u1"), Some(json!({"text": "one"}))).await;
    let day = posted["timestamp"].as_str().unwrap()[..10].to_string();

    let (status, report) = app
        .call("POST", &format!("/api/admin/activity/{}/recount", day), Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", report);
    assert_eq!(report["rows_written"], 1);

    let row = app
        .store
        .get(&Collection::DailyMessageCounts, &format!("U1_{}_{}", group, day))
        .await
        .unwrap()
        .expect("row for U1");
    assert_eq!(row.body["count"], 1);
}
