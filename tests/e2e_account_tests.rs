//! End-to-end tests for profiles, saved jobs, follows and notifications

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn profile_upsert_and_read_back() {
    let server = TestServer::spawn().await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;

    // No profile yet
    let response = candidate.get("/v1/account/profile").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = candidate
        .put_json(
            "/v1/account/profile",
            &json!({
                "full_name": "Carla Bruni",
                "headline": "Rust developer",
                "location": "Milano",
                "years_experience": 6,
                "skills": ["rust", "sql"],
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile: Value = candidate
        .get("/v1/account/profile")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(profile["full_name"], "Carla Bruni");
    assert_eq!(profile["skills"], json!(["rust", "sql"]));

    // Replacing drops fields that are omitted
    let response = candidate
        .put_json("/v1/account/profile", &json!({"full_name": "C. Bruni"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = candidate
        .get("/v1/account/profile")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(profile["full_name"], "C. Bruni");
    assert!(profile["headline"].is_null());

    // Empty name is rejected
    let response = candidate
        .put_json("/v1/account/profile", &json!({"full_name": "  "}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn saved_jobs_roundtrip() {
    let server = TestServer::spawn().await;
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;

    let company_id = employer.create_company("Acme").await;
    let job_id = employer.create_active_job(&company_id, "Backend Engineer").await;

    // Saving a job that doesn't exist fails
    let response = candidate.put_empty("/v1/account/saved/nope").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = candidate
        .put_empty(&format!("/v1/account/saved/{}", job_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    // Saving twice is idempotent
    let response = candidate
        .put_empty(&format!("/v1/account/saved/{}", job_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let saved: Value = candidate.get("/v1/account/saved").await.json().await.unwrap();
    assert_eq!(saved, json!([job_id]));

    let response = candidate
        .delete(&format!("/v1/account/saved/{}", job_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let saved: Value = candidate.get("/v1/account/saved").await.json().await.unwrap();
    assert_eq!(saved, json!([]));

    // Employers lack the SaveAndFollow permission
    let response = employer.get("/v1/account/saved").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn following_a_company_yields_publish_notifications() {
    let server = TestServer::spawn().await;
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;

    let company_id = employer.create_company("Acme").await;

    let response = candidate
        .put_empty(&format!("/v1/account/follows/{}", company_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let follows: Value = candidate
        .get("/v1/account/follows")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(follows, json!([company_id]));

    // Publishing a job notifies the follower
    let job_id = employer.create_active_job(&company_id, "Backend Engineer").await;

    let unread: Value = candidate
        .get("/v1/account/notifications/unread_count")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unread["unread"], 1);

    let notifications: Value = candidate
        .get("/v1/account/notifications")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(notifications[0]["kind"], "job_published");
    assert_eq!(notifications[0]["data"]["job_id"], job_id.as_str());
    assert_eq!(notifications[0]["data"]["company_name"], "Acme");

    // Unfollow stops further notifications
    candidate
        .delete(&format!("/v1/account/follows/{}", company_id))
        .await;
    employer.create_active_job(&company_id, "Second Role").await;
    let unread: Value = candidate
        .get("/v1/account/notifications/unread_count")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unread["unread"], 1);
}

#[tokio::test]
async fn notifications_mark_read_and_read_all() {
    let server = TestServer::spawn().await;
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;

    let company_id = employer.create_company("Acme").await;
    candidate
        .put_empty(&format!("/v1/account/follows/{}", company_id))
        .await;
    employer.create_active_job(&company_id, "Role One").await;
    employer.create_active_job(&company_id, "Role Two").await;

    let notifications: Value = candidate
        .get("/v1/account/notifications?unread_only=true")
        .await
        .json()
        .await
        .unwrap();
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    let first_id = notifications[0]["id"].as_str().unwrap().to_string();

    let response = candidate
        .post_empty(&format!("/v1/account/notifications/{}/read", first_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["read_at"].as_i64().is_some());

    let unread: Value = candidate
        .get("/v1/account/notifications/unread_count")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unread["unread"], 1);

    // Unknown or foreign notifications 404
    let response = candidate
        .post_empty("/v1/account/notifications/not-a-real-id/read")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = candidate
        .post_empty("/v1/account/notifications/read_all")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let unread: Value = candidate
        .get("/v1/account/notifications/unread_count")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unread["unread"], 0);
}
