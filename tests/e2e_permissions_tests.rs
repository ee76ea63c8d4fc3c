//! End-to-end tests for permission gating and the admin surface

mod common;

use common::{TestClient, TestServer, TEST_CANDIDATE};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn unauthenticated_requests_are_forbidden() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for route in [
        "/v1/board/jobs",
        "/v1/board/companies",
        "/v1/account/notifications",
        "/v1/applications",
        "/v1/admin/users",
    ] {
        let response = client.get(route).await;
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "route {} should require a session",
            route
        );
    }
}

#[tokio::test]
async fn admin_surface_is_admin_only() {
    let server = TestServer::spawn().await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;

    for client in [&candidate, &employer] {
        assert_eq!(
            client.get("/v1/admin/users").await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            client.get("/v1/admin/stats").await.status(),
            StatusCode::FORBIDDEN
        );
    }
}

#[tokio::test]
async fn admin_lists_users_with_roles() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;

    let users: Value = admin.get("/v1/admin/users").await.json().await.unwrap();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 3);

    let candidate = users
        .iter()
        .find(|u| u["handle"] == TEST_CANDIDATE)
        .unwrap();
    assert_eq!(candidate["roles"], json!(["Candidate"]));
}

#[tokio::test]
async fn admin_grants_and_revokes_roles() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;

    let session: Value = candidate.get_session().await.json().await.unwrap();
    let user_id = session["user_id"].as_u64().unwrap();

    // Candidates cannot create companies...
    let response = candidate
        .post_json(
            "/v1/board/companies",
            &json!({"name": "Side Hustle", "description": "mine"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // ...until an admin grants the Employer role
    let response = admin
        .put_empty(&format!("/v1/admin/users/{}/roles/employer", user_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = candidate
        .post_json(
            "/v1/board/companies",
            &json!({"name": "Side Hustle", "description": "mine"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Revoking takes effect on the next request
    let response = admin
        .delete(&format!("/v1/admin/users/{}/roles/employer", user_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = candidate
        .post_json(
            "/v1/board/companies",
            &json!({"name": "Second Hustle", "description": "mine"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown roles and users are rejected
    let response = admin
        .put_empty(&format!("/v1/admin/users/{}/roles/wizard", user_id))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = admin.put_empty("/v1/admin/users/99999/roles/employer").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_stats_reflect_board_counts() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;
    let candidate = TestClient::authenticated_candidate(server.base_url.clone()).await;

    let company_id = employer.create_company("Acme").await;
    let job_id = employer.create_active_job(&company_id, "Backend Engineer").await;
    employer.create_job(&company_id, "Draft Role").await;
    candidate
        .post_json(&format!("/v1/board/jobs/{}/apply", job_id), &json!({}))
        .await;

    let stats: Value = admin.get("/v1/admin/stats").await.json().await.unwrap();
    assert_eq!(stats["companies"], 1);
    assert_eq!(stats["jobs_total"], 2);
    assert_eq!(stats["jobs_active"], 1);
    assert_eq!(stats["applications"], 1);
}

#[tokio::test]
async fn admin_sees_drafts_and_moderates_foreign_jobs() {
    let server = TestServer::spawn().await;
    let admin = TestClient::authenticated_admin(server.base_url.clone()).await;
    let employer = TestClient::authenticated_employer(server.base_url.clone()).await;

    let company_id = employer.create_company("Acme").await;
    let job_id = employer.create_job(&company_id, "Draft Role").await;

    let response = admin.get(&format!("/v1/board/jobs/{}", job_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = admin.delete(&format!("/v1/board/jobs/{}", job_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = employer.get(&format!("/v1/board/jobs/{}", job_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
