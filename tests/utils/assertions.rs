//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::TestResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a TestResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a TestResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: u16) -> Self {
        assert_eq!(
            self.response.status.as_u16(),
            expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    pub fn has_body(self, expected: Value) -> Self {
        assert_eq!(self.response.body, expected);
        self
    }

    pub fn has_field(self, field: &str, expected: Value) -> Self {
        assert_eq!(
            self.response.body[field], expected,
            "field {} mismatch in {}",
            field, self.response.body
        );
        self
    }

    pub fn set_session_cookie(self) -> Self {
        assert!(
            self.response.set_cookie.is_some(),
            "expected a session cookie to be issued"
        );
        self
    }

    pub fn set_no_cookie(self) -> Self {
        assert!(
            self.response.set_cookie.is_none(),
            "expected no new session cookie"
        );
        self
    }

    /// Asserts the response is a room carrying the given policy
    pub fn is_room_with(self, guest_can_pause: bool, votes_to_skip: i32) -> Self {
        self.has_field("guest_can_pause", Value::Bool(guest_can_pause))
            .has_field("votes_to_skip", Value::from(votes_to_skip))
    }
}
