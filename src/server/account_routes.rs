use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::session::Session;
use super::state::{GuardedUserManager, GuardedUserStore, ServerState};
use crate::notifications::NotificationStore;
use crate::user::{CandidateProfile, Permission};

#[derive(Deserialize, Debug)]
struct ProfileBody {
    pub full_name: String,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Serialize)]
struct UnreadCountResponse {
    unread: usize,
}

async fn get_profile(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> Response {
    match user_manager
        .lock()
        .unwrap()
        .get_candidate_profile(session.user_id)
    {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to load profile: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn put_profile(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<ProfileBody>,
) -> Response {
    let profile = CandidateProfile {
        user_id: session.user_id,
        full_name: body.full_name,
        headline: body.headline,
        summary: body.summary,
        location: body.location,
        years_experience: body.years_experience,
        skills: body.skills,
        updated: 0, // stamped by the store
    };
    match user_manager
        .lock()
        .unwrap()
        .update_candidate_profile(profile)
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    }
}

async fn get_saved_jobs(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> Response {
    if !session.has_permission(Permission::SaveAndFollow) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match user_manager.lock().unwrap().get_saved_jobs(session.user_id) {
        Ok(job_ids) => Json(job_ids).into_response(),
        Err(err) => {
            error!("Failed to load saved jobs: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn update_saved_job(
    user_manager: GuardedUserManager,
    user_id: usize,
    job_id: &str,
    saved: bool,
) -> Response {
    match user_manager
        .lock()
        .unwrap()
        .set_saved_job(user_id, job_id, saved)
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    }
}

async fn save_job(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(job_id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::SaveAndFollow) {
        return StatusCode::FORBIDDEN.into_response();
    }
    update_saved_job(user_manager, session.user_id, &job_id, true)
}

async fn unsave_job(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(job_id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::SaveAndFollow) {
        return StatusCode::FORBIDDEN.into_response();
    }
    update_saved_job(user_manager, session.user_id, &job_id, false)
}

async fn get_follows(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> Response {
    if !session.has_permission(Permission::SaveAndFollow) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match user_manager
        .lock()
        .unwrap()
        .get_followed_companies(session.user_id)
    {
        Ok(company_ids) => Json(company_ids).into_response(),
        Err(err) => {
            error!("Failed to load follows: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn update_company_follow(
    user_manager: GuardedUserManager,
    user_id: usize,
    company_id: &str,
    following: bool,
) -> Response {
    match user_manager
        .lock()
        .unwrap()
        .set_company_follow(user_id, company_id, following)
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    }
}

async fn follow_company(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(company_id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::SaveAndFollow) {
        return StatusCode::FORBIDDEN.into_response();
    }
    update_company_follow(user_manager, session.user_id, &company_id, true)
}

async fn unfollow_company(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(company_id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::SaveAndFollow) {
        return StatusCode::FORBIDDEN.into_response();
    }
    update_company_follow(user_manager, session.user_id, &company_id, false)
}

async fn get_notifications(
    session: Session,
    State(user_store): State<GuardedUserStore>,
    Query(query): Query<NotificationsQuery>,
) -> Response {
    match user_store.get_user_notifications(session.user_id, query.unread_only) {
        Ok(notifications) => Json(notifications).into_response(),
        Err(err) => {
            error!("Failed to load notifications: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_unread_count(
    session: Session,
    State(user_store): State<GuardedUserStore>,
) -> Response {
    match user_store.count_unread_notifications(session.user_id) {
        Ok(unread) => Json(UnreadCountResponse { unread }).into_response(),
        Err(err) => {
            error!("Failed to count notifications: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn mark_notification_read(
    session: Session,
    State(user_store): State<GuardedUserStore>,
    Path(id): Path<String>,
) -> Response {
    match user_store.mark_notification_read(session.user_id, &id) {
        Ok(Some(notification)) => Json(notification).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to mark notification read: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn mark_all_notifications_read(
    session: Session,
    State(user_store): State<GuardedUserStore>,
) -> Response {
    match user_store.mark_all_notifications_read(session.user_id) {
        Ok(updated) => Json(serde_json::json!({ "updated": updated })).into_response(),
        Err(err) => {
            error!("Failed to mark notifications read: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub(super) fn make_account_routes(state: ServerState) -> Router {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile", put(put_profile))
        .route("/saved", get(get_saved_jobs))
        .route("/saved/{job_id}", put(save_job))
        .route("/saved/{job_id}", delete(unsave_job))
        .route("/follows", get(get_follows))
        .route("/follows/{company_id}", put(follow_company))
        .route("/follows/{company_id}", delete(unfollow_company))
        .route("/notifications", get(get_notifications))
        .route("/notifications/unread_count", get(get_unread_count))
        .route("/notifications/{id}/read", post(mark_notification_read))
        .route("/notifications/read_all", post(mark_all_notifications_read))
        .with_state(state)
}
