//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per dashboard endpoint.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Royalty Endpoints
    // ========================================================================

    /// POST /v1/royalty/upload with all three fields
    pub async fn upload_report(
        &self,
        platform: &str,
        month: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Response {
        let form = Form::new()
            .text("platform", platform.to_string())
            .text("month", month.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        self.upload_form(form).await
    }

    /// POST /v1/royalty/upload with an arbitrary form
    pub async fn upload_form(&self, form: Form) -> Response {
        self.client
            .post(format!("{}/v1/royalty/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    /// GET /v1/royalty/records with a raw query string
    pub async fn list_records(&self, query: &str) -> Response {
        if query.is_empty() {
            self.get("/v1/royalty/records").await
        } else {
            self.get(&format!("/v1/royalty/records?{}", query)).await
        }
    }

    // ========================================================================
    // Analytics Endpoints
    // ========================================================================

    /// GET /v1/analytics/basic-details
    pub async fn get_basic_details(&self) -> Response {
        self.get("/v1/analytics/basic-details").await
    }

    /// GET /v1/analytics/subscription-details
    pub async fn get_subscription_details(&self) -> Response {
        self.get("/v1/analytics/subscription-details").await
    }

    /// GET /v1/analytics/user-details
    pub async fn get_user_details(&self) -> Response {
        self.get("/v1/analytics/user-details").await
    }

    /// GET /v1/analytics/plan-details
    pub async fn get_plan_details(&self) -> Response {
        self.get("/v1/analytics/plan-details").await
    }

    /// GET /v1/analytics/trend-details
    pub async fn get_trend_details(&self) -> Response {
        self.get("/v1/analytics/trend-details").await
    }

    /// GET /v1/subscriptions/top
    pub async fn get_top_subscriptions(&self) -> Response {
        self.get("/v1/subscriptions/top").await
    }

    // ========================================================================
    // Support Endpoints
    // ========================================================================

    /// GET /v1/support/tickets
    pub async fn get_tickets(&self, status: Option<&str>) -> Response {
        match status {
            Some(status) => self.get(&format!("/v1/support/tickets?status={}", status)).await,
            None => self.get("/v1/support/tickets").await,
        }
    }

    /// GET /v1/support/replies
    pub async fn get_replies(&self, ticket_id: Option<&str>) -> Response {
        match ticket_id {
            Some(id) => self.get(&format!("/v1/support/replies?ticketId={}", id)).await,
            None => self.get("/v1/support/replies").await,
        }
    }
}
