//! Room workflow actions - wrap the HTTP calls a front end makes
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::{json, Value};

use super::setup::{TestClient, TestResponse};

impl TestClient {
    pub async fn create_room(&self, guest_can_pause: bool, votes_to_skip: i32) -> TestResponse {
        self.post(
            "/api/create-room",
            json!({"guest_can_pause": guest_can_pause, "votes_to_skip": votes_to_skip}),
        )
        .await
    }

    /// Creates a room and returns its code, asserting success
    pub async fn create_room_code(&self, guest_can_pause: bool, votes_to_skip: i32) -> String {
        let response = self.create_room(guest_can_pause, votes_to_skip).await;
        assert_eq!(response.status, 201, "create failed: {}", response.body);
        response.body["code"].as_str().unwrap().to_string()
    }

    pub async fn join_room(&self, code: &str) -> TestResponse {
        self.post("/api/join-room", json!({ "code": code })).await
    }

    pub async fn get_room(&self, code: &str) -> TestResponse {
        self.get(&format!("/api/get-room?code={code}")).await
    }

    pub async fn user_in_room(&self) -> Option<String> {
        let response = self.get("/api/user-in-room").await;
        assert_eq!(response.status, 200);
        response.body["code"].as_str().map(str::to_string)
    }

    pub async fn leave_room(&self) -> TestResponse {
        self.post("/api/leave-room", Value::Null).await
    }

    pub async fn update_room(&self, body: Value) -> TestResponse {
        self.patch("/api/update-room", body).await
    }
}
