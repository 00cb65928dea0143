#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt; // for `oneshot`

use jamroom::{
    build_router, build_state,
    config::AppConfig,
    room::repository::InMemoryRoomRepository,
    session::repository::InMemorySessionRepository,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub room_repository: Arc<InMemoryRoomRepository>,
    pub session_repository: Arc<InMemorySessionRepository>,
}

impl TestSetup {
    /// A new browser-like client with an empty cookie jar
    pub fn client(&self) -> TestClient {
        TestClient {
            app: self.app.clone(),
            cookie: Mutex::new(None),
        }
    }
}

pub struct TestSetupBuilder {
    config: AppConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_code_length(mut self, length: usize) -> Self {
        self.config.room.code_length = length;
        self
    }

    pub fn with_max_code_attempts(mut self, attempts: u32) -> Self {
        self.config.room.max_code_attempts = attempts;
        self
    }

    pub fn build(self) -> TestSetup {
        let room_repository = Arc::new(InMemoryRoomRepository::new());
        let session_repository = Arc::new(InMemorySessionRepository::new());

        let state = build_state(
            self.config,
            session_repository.clone(),
            room_repository.clone(),
        );

        TestSetup {
            app: build_router(state),
            room_repository,
            session_repository,
        }
    }
}

// ============================================================================
// Test Client
// ============================================================================

/// Response captured by the test client
pub struct TestResponse {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

/// Drives the router like a browser, keeping the session cookie between requests
pub struct TestClient {
    app: Router,
    cookie: Mutex<Option<String>>,
}

impl TestClient {
    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    /// Replaces the stored cookie, e.g. to simulate a tampered token
    pub fn set_cookie(&self, cookie: &str) {
        *self.cookie.lock().unwrap() = Some(cookie.to_string());
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie() {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string);
        if let Some(cookie) = &set_cookie {
            *self.cookie.lock().unwrap() = Some(cookie.clone());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            set_cookie,
            body,
        }
    }
}
