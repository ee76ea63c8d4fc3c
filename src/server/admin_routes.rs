use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::error;

use super::board_routes::board_error_response;
use super::metrics::set_board_metrics;
use super::session::Session;
use super::state::{GuardedBoardManager, GuardedUserManager, ServerState};
use crate::user::{Permission, UserRole};

async fn list_users(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> Response {
    if !session.has_permission(Permission::ManageUsers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match user_manager.lock().unwrap().list_users() {
        Ok(users) => Json(users).into_response(),
        Err(err) => {
            error!("Failed to list users: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn parse_role(role: &str) -> Result<UserRole, Response> {
    UserRole::from_str(role).ok_or_else(|| {
        (StatusCode::BAD_REQUEST, format!("Unknown role '{}'.", role)).into_response()
    })
}

async fn add_role(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path((user_id, role)): Path<(usize, String)>,
) -> Response {
    if !session.has_permission(Permission::ManageUsers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    match user_manager.lock().unwrap().add_user_role(user_id, role) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    }
}

async fn remove_role(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path((user_id, role)): Path<(usize, String)>,
) -> Response {
    if !session.has_permission(Permission::ManageUsers) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let role = match parse_role(&role) {
        Ok(role) => role,
        Err(response) => return response,
    };
    match user_manager.lock().unwrap().remove_user_role(user_id, role) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    }
}

async fn get_stats(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
) -> Response {
    if !session.has_permission(Permission::ViewAnalytics) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.stats() {
        Ok(stats) => {
            // The stats read doubles as a refresh of the Prometheus gauges
            set_board_metrics(stats);
            Json(stats).into_response()
        }
        Err(err) => board_error_response(err),
    }
}

pub(super) fn make_admin_routes(state: ServerState) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{user_id}/roles/{role}", put(add_role))
        .route("/users/{user_id}/roles/{role}", delete(remove_role))
        .route("/stats", get(get_stats))
        .with_state(state)
}
