use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, put},
    Json, Router,
};
use serde::Deserialize;

use super::board_routes::board_error_response;
use super::session::Session;
use super::state::{GuardedBoardManager, ServerState};
use crate::user::Permission;

#[derive(Deserialize, Debug)]
struct UpdateCommentBody {
    pub body: String,
}

async fn put_comment(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCommentBody>,
) -> Response {
    if !session.has_permission(Permission::CommentAndReview) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.update_comment(&id, session.user_id, body.body) {
        Ok(comment) => Json(comment).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn delete_comment(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    let can_moderate = session.has_permission(Permission::ModerateContent);
    if !session.has_permission(Permission::CommentAndReview) && !can_moderate {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.delete_comment(&id, session.user_id, can_moderate) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn delete_review(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    let can_moderate = session.has_permission(Permission::ModerateContent);
    if !session.has_permission(Permission::CommentAndReview) && !can_moderate {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.delete_review(&id, session.user_id, can_moderate) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(super) fn make_community_routes(state: ServerState) -> Router {
    Router::new()
        .route("/comments/{id}", put(put_comment))
        .route("/comments/{id}", delete(delete_comment))
        .route("/reviews/{id}", delete(delete_review))
        .with_state(state)
}
