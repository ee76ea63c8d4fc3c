//! End-to-end tests for registration, login, logout and session handling

mod common;

use common::{TestClient, TestServer, CANDIDATE_PASS, TEST_CANDIDATE};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn login_with_wrong_password_is_forbidden() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_CANDIDATE, "not-the-password").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_with_unknown_user_is_forbidden() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("nobody", "whatever-pass").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_returns_token_and_sets_cookie() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_CANDIDATE, CANDIDATE_PASS).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("set-cookie"));

    let body: Value = response.json().await.unwrap();
    assert!(body["token"].as_str().unwrap().len() >= 32);

    // The cookie now authenticates requests
    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);
    let session: Value = response.json().await.unwrap();
    assert_eq!(session["handle"], TEST_CANDIDATE);
    assert!(session["roles"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "Candidate"));
    assert!(session["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p == "ApplyToJobs"));
}

#[tokio::test]
async fn token_works_in_authorization_header() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_CANDIDATE, CANDIDATE_PASS).await;
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // A cookie-less client with only the header
    let bare = reqwest::Client::new();
    let response = bare
        .get(format!("{}/v1/board/jobs", server.base_url))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_candidate_and_login() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .register("fresh_user", "a-decent-password", "candidate")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert!(body["user_id"].as_u64().unwrap() > 0);

    let response = client.login("fresh_user", "a-decent-password").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn register_rejects_taken_handle_bad_role_and_weak_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .register(TEST_CANDIDATE, "a-decent-password", "candidate")
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .register("sneaky", "a-decent-password", "admin")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .register("sneaky", "a-decent-password", "overlord")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.register("shortpw", "short", "candidate").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_candidate(server.base_url.clone()).await;

    assert_eq!(client.get_session().await.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
