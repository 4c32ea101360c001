//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.

/// Bearer token that grants access to the admin routes in tests.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// How long to wait for the server to start accepting requests.
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Poll interval while waiting for the server or the queue worker.
pub const POLL_INTERVAL_MS: u64 = 25;

/// Request timeout for the test client.
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
