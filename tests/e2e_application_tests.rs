//! End-to-end tests for the application flow

mod common;

use common::{TestClient, TestServer};
use lavoro_server::board::JobStore;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

async fn setup_active_job(server: &TestServer) -> (TestClient, TestClient, String) {
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;
    let company_id = employer.create_company("Acme").await;
    let job_id = employer.create_active_job(&company_id, "Backend Engineer").await;
    (employer, candidate, job_id)
}

#[tokio::test]
async fn candidate_applies_and_employer_is_notified() {
    let server = TestServer::spawn().await;
    let (employer, candidate, job_id) = setup_active_job(&server).await;

    let response = candidate
        .post_json(
            &format!("/v1/board/jobs/{}/apply", job_id),
            &json!({"cover_letter": "I would love to work on this."}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let application: Value = response.json().await.unwrap();
    assert_eq!(application["status"], "submitted");
    assert_eq!(application["job_id"], job_id.as_str());

    // The job author got a notification row
    let notifications: Value = employer
        .get("/v1/account/notifications")
        .await
        .json()
        .await
        .unwrap();
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "application_received");
    assert_eq!(notifications[0]["data"]["job_id"], job_id.as_str());
}

#[tokio::test]
async fn applying_twice_conflicts() {
    let server = TestServer::spawn().await;
    let (_employer, candidate, job_id) = setup_active_job(&server).await;

    let response = candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn employer_cannot_apply() {
    let server = TestServer::spawn().await;
    let (employer, _candidate, job_id) = setup_active_job(&server).await;

    // Employers don't hold the ApplyToJobs permission
    let response = employer
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn applying_to_a_closed_or_overdue_job_conflicts() {
    let server = TestServer::spawn().await;
    let (employer, candidate, job_id) = setup_active_job(&server).await;

    employer
        .post_empty(&format!("/v1/board/jobs/{}/close", job_id))
        .await;
    let response = candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Reopen, then let the deadline pass behind the scenes
    employer
        .post_empty(&format!("/v1/board/jobs/{}/reopen", job_id))
        .await;
    let mut job = server.board_store.get_job(&job_id).unwrap().unwrap();
    job.deadline = Some(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
            - 60,
    );
    server.board_store.update_job(&job).unwrap();

    let response = candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    // The expiry was persisted before the request was evaluated
    assert_eq!(
        server.board_store.get_job(&job_id).unwrap().unwrap().status,
        lavoro_server::board::JobStatus::Expired
    );
}

#[tokio::test]
async fn employer_reviews_applications_with_candidate_profile() {
    let server = TestServer::spawn().await;
    let (employer, candidate, job_id) = setup_active_job(&server).await;

    candidate
        .put_json(
            "/v1/account/profile",
            &json!({
                "full_name": "Carla Bruni",
                "headline": "Rust developer",
                "skills": ["rust", "sql"],
            }),
        )
        .await;
    candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;

    // Candidates cannot read the employer's view
    let response = candidate
        .get(&format!("/v1/board/jobs/{}/applications", job_id))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = employer
        .get(&format!("/v1/board/jobs/{}/applications", job_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let applications: Value = response.json().await.unwrap();
    let applications = applications.as_array().unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["candidate_handle"], "candidate1");
    assert_eq!(
        applications[0]["candidate_profile"]["full_name"],
        "Carla Bruni"
    );
}

#[tokio::test]
async fn status_moves_flow_back_to_the_candidate() {
    let server = TestServer::spawn().await;
    let (employer, candidate, job_id) = setup_active_job(&server).await;

    let response = candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    let application: Value = response.json().await.unwrap();
    let application_id = application["id"].as_str().unwrap().to_string();

    // Unknown status is a bad request, Submitted is not assignable
    let response = employer
        .put_json(
            &format!("/v1/applications/{}/status", application_id),
            &json!({"status": "maybe"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = employer
        .put_json(
            &format!("/v1/applications/{}/status", application_id),
            &json!({"status": "submitted"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = employer
        .put_json(
            &format!("/v1/applications/{}/status", application_id),
            &json!({"status": "shortlisted"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The candidate sees the move in their own listing and notifications
    let own: Value = candidate.get("/v1/applications").await.json().await.unwrap();
    assert_eq!(own[0]["status"], "shortlisted");

    let notifications: Value = candidate
        .get("/v1/account/notifications")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(notifications[0]["kind"], "application_status_changed");
    assert_eq!(notifications[0]["data"]["status"], "shortlisted");
}

#[tokio::test]
async fn withdraw_is_terminal() {
    let server = TestServer::spawn().await;
    let (employer, candidate, job_id) = setup_active_job(&server).await;

    let response = candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;
    let application: Value = response.json().await.unwrap();
    let application_id = application["id"].as_str().unwrap().to_string();

    let response = candidate
        .delete(&format!("/v1/applications/{}", application_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "withdrawn");

    // Withdrawing twice is a bad request
    let response = candidate
        .delete(&format!("/v1/applications/{}", application_id))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The employer cannot move a withdrawn application
    let response = employer
        .put_json(
            &format!("/v1/applications/{}/status", application_id),
            &json!({"status": "in_review"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
