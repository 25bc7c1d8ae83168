use axum::http::{Method, StatusCode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use todo_web::session::SessionRegistry;

mod common;

use common::{TestClient, task_id};

fn texts(response: &common::TestResponse) -> Vec<String> {
    response.json()["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn can_list_empty_session() {
    let mut client = TestClient::new();

    let response = client.get("/api/v1/tasks").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["count"], 0);
    assert_eq!(body["summary"]["total"], 0);
}

#[tokio::test]
async fn can_add_task_with_trimmed_text() {
    let mut client = TestClient::new();

    let response = client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "  Buy milk  " }))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["changed"], true);
    assert_eq!(body["notice"], "Task added successfully!");
    assert_eq!(body["task"]["text"], "Buy milk");
    assert_eq!(body["task"]["done"], false);
    assert_eq!(body["task"]["id"].as_str().unwrap().len(), 32);
    assert_eq!(body["summary"]["total"], 1);
}

#[tokio::test]
async fn cannot_add_blank_task() {
    let mut client = TestClient::new();

    for text in ["", "   "] {
        let response = client
            .json(Method::POST, "/api/v1/tasks", json!({ "text": text }))
            .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "task cannot be empty");
    }

    let list = client.get("/api/v1/tasks").await;
    assert_eq!(list.json()["count"], 0);
}

#[tokio::test]
async fn can_split_tasks_by_view() {
    let mut client = TestClient::new();
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Buy milk" }))
        .await;
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Walk dog" }))
        .await;
    let milk = task_id(&mut client, "Buy milk").await;

    let toggled = client
        .json(
            Method::PUT,
            &format!("/api/v1/tasks/{milk}/done"),
            json!({ "done": true }),
        )
        .await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert!(toggled.json()["notice"].is_null());
    assert_eq!(toggled.json()["task"]["done"], true);

    let done = client.get("/api/v1/tasks?view=done").await;
    let active = client.get("/api/v1/tasks?view=active").await;
    let all = client.get("/api/v1/tasks").await;

    assert_eq!(texts(&done), vec!["Buy milk"]);
    assert_eq!(texts(&active), vec!["Walk dog"]);
    assert_eq!(texts(&all), vec!["Buy milk", "Walk dog"]);
    assert_eq!(all.json()["summary"]["active"], 1);
}

#[tokio::test]
async fn double_toggle_restores_flag() {
    let mut client = TestClient::new();
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Buy milk" }))
        .await;
    let id = task_id(&mut client, "Buy milk").await;
    let uri = format!("/api/v1/tasks/{id}/done");

    client.json(Method::PUT, &uri, json!({ "done": true })).await;
    let response = client.json(Method::PUT, &uri, json!({ "done": false })).await;

    assert_eq!(response.json()["task"]["done"], false);
}

#[tokio::test]
async fn can_update_text_and_reject_blank() {
    let mut client = TestClient::new();
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Buy milk" }))
        .await;
    let id = task_id(&mut client, "Buy milk").await;
    let uri = format!("/api/v1/tasks/{id}/text");

    let updated = client
        .json(Method::PUT, &uri, json!({ "text": "  new text  " }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["task"]["text"], "new text");
    assert_eq!(updated.json()["notice"], "Task updated");

    let rejected = client.json(Method::PUT, &uri, json!({ "text": "" })).await;
    assert_eq!(rejected.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(texts(&client.get("/api/v1/tasks").await), vec!["new text"]);
}

#[tokio::test]
async fn unknown_ids_are_harmless() {
    let mut client = TestClient::new();
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Keep me" }))
        .await;

    let deleted = client.delete("/api/v1/tasks/missing").await;
    let toggled = client
        .json(Method::PUT, "/api/v1/tasks/missing/done", json!({ "done": true }))
        .await;
    let updated = client
        .json(Method::PUT, "/api/v1/tasks/missing/text", json!({ "text": "x" }))
        .await;

    for response in [&deleted, &toggled, &updated] {
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["changed"], false);
    }
    assert_eq!(texts(&client.get("/api/v1/tasks").await), vec!["Keep me"]);
}

#[tokio::test]
async fn can_delete_task() {
    let mut client = TestClient::new();
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Buy milk" }))
        .await;
    client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Walk dog" }))
        .await;
    let id = task_id(&mut client, "Buy milk").await;

    let response = client.delete(&format!("/api/v1/tasks/{id}")).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["changed"], true);
    assert_eq!(body["notice"], "Task deleted");
    assert!(body["task"].is_null());
    assert_eq!(texts(&client.get("/api/v1/tasks").await), vec!["Walk dog"]);
}

#[tokio::test]
async fn reading_without_cookie_does_not_register_sessions() {
    let registry = Arc::new(SessionRegistry::new("todo_session", Duration::from_secs(600)));
    let app = todo_web::web::create_app(registry.clone());

    for _ in 0..20 {
        let mut visitor = TestClient::with_app(app.clone());
        let response = visitor.get("/api/v1/tasks").await;
        assert_eq!(response.status, StatusCode::OK);
    }
    assert!(registry.is_empty());

    let mut client = TestClient::with_app(app);
    client.get("/api/v1/tasks").await;
    let response = client
        .json(Method::POST, "/api/v1/tasks", json!({ "text": "Buy milk" }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(registry.len(), 1);

    let listed = client.get("/api/v1/tasks").await;
    assert_eq!(texts(&listed), vec!["Buy milk"]);
    assert_eq!(registry.len(), 1);
}
