//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with cookie-based session handling and convenience
//! constructors for the pre-provisioned accounts. When API routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows. For most tests, use one
    /// of the `authenticated_*` constructors instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn authenticated(base_url: String, handle: &str, password: &str) -> Self {
        let client = Self::new(base_url);
        let response = client.login(handle, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of '{}' failed: {:?}",
            handle,
            response.text().await
        );
        client
    }

    /// Creates a client pre-authenticated as the test candidate
    pub async fn authenticated_candidate(base_url: String) -> Self {
        Self::authenticated(base_url, TEST_CANDIDATE, CANDIDATE_PASS).await
    }

    /// Creates a client pre-authenticated as the test employer
    pub async fn authenticated_employer(base_url: String) -> Self {
        Self::authenticated(base_url, TEST_EMPLOYER, EMPLOYER_PASS).await
    }

    /// Creates a client pre-authenticated as the admin user
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::authenticated(base_url, ADMIN_USER, ADMIN_PASS).await
    }

    // ========================================================================
    // Generic helpers
    // ========================================================================

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn post_empty(&self, path: &str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    pub async fn put_empty(&self, path: &str) -> Response {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("PUT request failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    // ========================================================================
    // Authentication endpoints
    // ========================================================================

    /// POST /v1/auth/login
    pub async fn login(&self, handle: &str, password: &str) -> Response {
        self.post_json(
            "/v1/auth/login",
            &json!({
                "user_handle": handle,
                "password": password,
            }),
        )
        .await
    }

    /// POST /v1/auth/register
    pub async fn register(&self, handle: &str, password: &str, role: &str) -> Response {
        self.post_json(
            "/v1/auth/register",
            &json!({
                "user_handle": handle,
                "password": password,
                "role": role,
            }),
        )
        .await
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.get("/v1/auth/logout").await
    }

    /// GET /v1/auth/session
    pub async fn get_session(&self) -> Response {
        self.get("/v1/auth/session").await
    }

    // ========================================================================
    // Board conveniences
    // ========================================================================

    /// POST /v1/board/companies, panics unless 201, returns the company id
    pub async fn create_company(&self, name: &str) -> String {
        let response = self
            .post_json(
                "/v1/board/companies",
                &json!({
                    "name": name,
                    "description": format!("{} does things", name),
                    "website": null,
                    "location": "Torino",
                }),
            )
            .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Company creation failed"
        );
        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    /// POST /v1/board/jobs, panics unless 201, returns the job id
    pub async fn create_job(&self, company_id: &str, title: &str) -> String {
        let response = self
            .post_json(
                "/v1/board/jobs",
                &json!({
                    "company_id": company_id,
                    "title": title,
                    "description": "Do the work",
                    "employment_type": "full_time",
                    "skills": ["rust"],
                }),
            )
            .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Job creation failed"
        );
        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a job and publishes it, returns the job id
    pub async fn create_active_job(&self, company_id: &str, title: &str) -> String {
        let job_id = self.create_job(company_id, title).await;
        let response = self
            .post_empty(&format!("/v1/board/jobs/{}/publish", job_id))
            .await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Job publish failed"
        );
        job_id
    }
}
