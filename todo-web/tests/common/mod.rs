#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use std::sync::Arc;
use std::time::Duration;
use todo_web::session::SessionRegistry;
use tower::ServiceExt;

/// Response captured from a single request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A browser-like client that keeps the session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        let registry = Arc::new(SessionRegistry::new("todo_session", Duration::from_secs(600)));
        Self::with_app(todo_web::web::create_app(registry))
    }

    pub fn with_app(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// A second client sharing the same server but without a session yet.
    pub fn fresh_session(&self) -> Self {
        Self::with_app(self.app.clone())
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn form(&mut self, method: Method, uri: &str, body: &str) -> TestResponse {
        self.send(
            method,
            uri,
            Some(("application/x-www-form-urlencoded", body.to_string())),
        )
        .await
    }

    pub async fn json(&mut self, method: Method, uri: &str, body: serde_json::Value) -> TestResponse {
        self.send(method, uri, Some(("application/json", body.to_string())))
            .await
    }

    async fn send(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<(&str, String)>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some((content_type, body)) => builder
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            self.cookie = Some(pair);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }
}

/// Returns the id of the first task whose text matches `text`.
pub async fn task_id(client: &mut TestClient, text: &str) -> String {
    let response = client.get("/api/v1/tasks").await;
    response.json()["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|task| task["text"] == text)
        .map(|task| task["id"].as_str().unwrap().to_string())
        .unwrap()
}
