use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;

use super::board_routes::board_error_response;
use super::session::Session;
use super::state::{GuardedApplicationManager, ServerState};
use crate::applications::ApplicationStatus;
use crate::user::Permission;

#[derive(Deserialize, Debug)]
struct SetStatusBody {
    pub status: String,
}

async fn list_own_applications(
    session: Session,
    State(application_manager): State<GuardedApplicationManager>,
) -> Response {
    if !session.has_permission(Permission::ApplyToJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match application_manager.list_for_candidate(session.user_id) {
        Ok(applications) => Json(applications).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn withdraw_application(
    session: Session,
    State(application_manager): State<GuardedApplicationManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::ApplyToJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match application_manager.withdraw(&id, session.user_id) {
        Ok(application) => Json(application).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn set_application_status(
    session: Session,
    State(application_manager): State<GuardedApplicationManager>,
    Path(id): Path<String>,
    Json(body): Json<SetStatusBody>,
) -> Response {
    if !session.has_permission(Permission::ReviewApplications) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let status = match ApplicationStatus::from_str(&body.status) {
        Some(status) => status,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Unknown application status '{}'.", body.status),
            )
                .into_response()
        }
    };
    match application_manager.set_status(&id, session.user_id, session.is_admin(), status) {
        Ok(application) => Json(application).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(super) fn make_application_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_own_applications))
        .route("/{id}", delete(withdraw_application))
        .route("/{id}/status", put(set_application_status))
        .with_state(state)
}
