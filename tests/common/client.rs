//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all club-registry-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with bearer-token admin access
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Bearer token attached to admin requests, if any
    admin_token: Option<String>,
}

impl TestClient {
    /// Creates a client without admin credentials.
    ///
    /// Use this for testing that admin routes reject anonymous callers.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            admin_token: None,
        }
    }

    /// Creates a client that authenticates against the admin routes.
    pub fn admin(base_url: String) -> Self {
        let mut client = Self::new(base_url);
        client.admin_token = Some(ADMIN_TOKEN.to_string());
        client
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.admin_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ========================================================================
    // Public Endpoints
    // ========================================================================

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// POST /registrations
    pub async fn create_registration(&self, club_name: &str, contact_email: &str) -> Response {
        self.client
            .post(format!("{}/registrations", self.base_url))
            .json(&json!({
                "club_name": club_name,
                "contact_email": contact_email,
            }))
            .send()
            .await
            .expect("Create registration request failed")
    }

    /// GET /registrations
    pub async fn list_registrations(&self) -> Response {
        self.client
            .get(format!("{}/registrations", self.base_url))
            .send()
            .await
            .expect("List registrations request failed")
    }

    /// GET /registrations/{id}
    pub async fn get_registration(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/registrations/{}", self.base_url, id))
            .send()
            .await
            .expect("Get registration request failed")
    }

    // ========================================================================
    // Admin Endpoints
    // ========================================================================

    /// GET /admin/settings/cancellation-date
    pub async fn get_cancellation_date(&self) -> Response {
        self.with_auth(
            self.client
                .get(format!("{}/admin/settings/cancellation-date", self.base_url)),
        )
        .send()
        .await
        .expect("Get cancellation date request failed")
    }

    /// PUT /admin/settings/cancellation-date
    pub async fn put_cancellation_date(&self, month: u32, day: u32) -> Response {
        self.with_auth(
            self.client
                .put(format!("{}/admin/settings/cancellation-date", self.base_url)),
        )
        .json(&json!({ "month": month, "day": day }))
        .send()
        .await
        .expect("Put cancellation date request failed")
    }

    /// DELETE /admin/settings/cancellation-date
    pub async fn delete_cancellation_date(&self) -> Response {
        self.with_auth(
            self.client
                .delete(format!("{}/admin/settings/cancellation-date", self.base_url)),
        )
        .send()
        .await
        .expect("Delete cancellation date request failed")
    }

    /// POST /admin/jobs/cancellation-sweep/run
    pub async fn run_cancellation_sweep(&self) -> Response {
        self.with_auth(self.client.post(format!(
            "{}/admin/jobs/cancellation-sweep/run",
            self.base_url
        )))
        .send()
        .await
        .expect("Run sweep request failed")
    }

    /// GET /admin/jobs/cancellation-sweep/history
    pub async fn get_sweep_history(&self) -> Response {
        self.with_auth(self.client.get(format!(
            "{}/admin/jobs/cancellation-sweep/history",
            self.base_url
        )))
        .send()
        .await
        .expect("Sweep history request failed")
    }

    /// GET /admin/queue
    pub async fn get_queue(&self) -> Response {
        self.with_auth(self.client.get(format!("{}/admin/queue", self.base_url)))
            .send()
            .await
            .expect("Queue request failed")
    }

    /// POST /admin/registrations/{id}/send-contract
    pub async fn send_contract(&self, id: &str) -> Response {
        self.with_auth(self.client.post(format!(
            "{}/admin/registrations/{}/send-contract",
            self.base_url, id
        )))
        .send()
        .await
        .expect("Send contract request failed")
    }
}
