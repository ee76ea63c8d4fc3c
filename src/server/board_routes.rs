use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::session::Session;
use super::state::{GuardedApplicationManager, GuardedBoardManager, ServerState};
use crate::board::{BoardError, EmploymentType, JobContent, JobFilter, JobStatus};
use crate::reviews::ReviewAggregate;
use crate::user::Permission;

pub(super) fn board_error_response(err: BoardError) -> Response {
    match err {
        BoardError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
        BoardError::Forbidden => StatusCode::FORBIDDEN.into_response(),
        BoardError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        BoardError::JobExpired
        | BoardError::JobNotOpen
        | BoardError::DuplicateApplication
        | BoardError::DuplicateReview => {
            let msg = err.to_string();
            (StatusCode::CONFLICT, msg).into_response()
        }
        BoardError::Store(err) => {
            error!("Board store error: {:#}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Parses an RFC 3339 deadline into unix seconds.
fn parse_deadline(deadline: &Option<String>) -> Result<Option<i64>, Response> {
    match deadline {
        None => Ok(None),
        Some(s) => match chrono::DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Ok(Some(dt.timestamp())),
            Err(_) => Err((
                StatusCode::BAD_REQUEST,
                format!("Invalid deadline '{}', expected RFC 3339.", s),
            )
                .into_response()),
        },
    }
}

fn parse_employment_type(s: &str) -> Result<EmploymentType, Response> {
    EmploymentType::from_str(s).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("Unknown employment type '{}'.", s),
        )
            .into_response()
    })
}

#[derive(Deserialize, Debug)]
struct CreateJobBody {
    pub company_id: String,
    pub title: String,
    pub description: String,
    pub employment_type: String,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub deadline: Option<String>,
}

#[derive(Deserialize, Debug)]
struct UpdateJobBody {
    pub title: String,
    pub description: String,
    pub employment_type: String,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub deadline: Option<String>,
}

#[derive(Deserialize, Debug)]
struct JobsQuery {
    pub q: Option<String>,
    pub company_id: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub mine: bool,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Deserialize, Debug)]
struct CreateCompanyBody {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize, Debug)]
struct UpdateCompanyBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PageQuery {
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Deserialize, Debug)]
struct CreateCommentBody {
    pub body: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CreateReviewBody {
    pub rating: u8,
    pub title: String,
    pub body: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApplyBody {
    pub cover_letter: Option<String>,
}

#[derive(Serialize)]
struct CompanyResponse {
    company: crate::board::Company,
    rating: ReviewAggregate,
}

async fn list_jobs(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Query(query): Query<JobsQuery>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }

    let employment_type = match &query.employment_type {
        Some(s) => match parse_employment_type(s) {
            Ok(et) => Some(et),
            Err(response) => return response,
        },
        None => None,
    };
    let status = match &query.status {
        Some(s) => match JobStatus::from_str(s) {
            Some(status) => Some(status),
            None => {
                return (StatusCode::BAD_REQUEST, format!("Unknown status '{}'.", s))
                    .into_response()
            }
        },
        None => None,
    };

    let filter = JobFilter {
        query: query.q,
        company_id: query.company_id,
        category: query.category,
        location: query.location,
        employment_type,
        status,
        author_id: if query.mine {
            Some(session.user_id)
        } else {
            None
        },
        limit: query.limit,
        offset: query.offset,
    };

    match board_manager.list_jobs(filter, Some(session.user_id), session.is_admin()) {
        Ok(page) => Json(page).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn create_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Json(body): Json<CreateJobBody>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let deadline = match parse_deadline(&body.deadline) {
        Ok(deadline) => deadline,
        Err(response) => return response,
    };
    let employment_type = match parse_employment_type(&body.employment_type) {
        Ok(et) => et,
        Err(response) => return response,
    };

    let content = JobContent {
        title: body.title,
        description: body.description,
        employment_type,
        salary_min: body.salary_min,
        salary_max: body.salary_max,
        category: body.category,
        location: body.location,
        skills: body.skills,
        deadline,
    };
    match board_manager.create_job(
        session.user_id,
        session.is_admin(),
        &body.company_id,
        content,
    ) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_job(&id, Some(session.user_id), session.is_admin()) {
        Ok(job) => Json(job).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn put_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
    Json(body): Json<UpdateJobBody>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let deadline = match parse_deadline(&body.deadline) {
        Ok(deadline) => deadline,
        Err(response) => return response,
    };
    let employment_type = match parse_employment_type(&body.employment_type) {
        Ok(et) => et,
        Err(response) => return response,
    };

    let content = JobContent {
        title: body.title,
        description: body.description,
        employment_type,
        salary_min: body.salary_min,
        salary_max: body.salary_max,
        category: body.category,
        location: body.location,
        skills: body.skills,
        deadline,
    };
    match board_manager.update_job(&id, session.user_id, session.is_admin(), content) {
        Ok(job) => Json(job).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn delete_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.delete_job(&id, session.user_id, session.is_admin()) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn publish_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.publish_job(&id, session.user_id, session.is_admin()) {
        Ok(job) => Json(job).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn close_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.close_job(&id, session.user_id, session.is_admin()) {
        Ok(job) => Json(job).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn reopen_job(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.reopen_job(&id, session.user_id, session.is_admin()) {
        Ok(job) => Json(job).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn apply_to_job(
    session: Session,
    State(application_manager): State<GuardedApplicationManager>,
    Path(id): Path<String>,
    Json(body): Json<ApplyBody>,
) -> Response {
    if !session.has_permission(Permission::ApplyToJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match application_manager.apply(&id, session.user_id, body.cover_letter) {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_job_applications(
    session: Session,
    State(application_manager): State<GuardedApplicationManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::ReviewApplications) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match application_manager.list_for_job(&id, session.user_id, session.is_admin()) {
        Ok(applications) => Json(applications).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_job_comments(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_job_comments(&id, Some(session.user_id), session.is_admin()) {
        Ok(comments) => Json(comments).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn post_job_comment(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
    Json(body): Json<CreateCommentBody>,
) -> Response {
    if !session.has_permission(Permission::CommentAndReview) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.add_comment(
        &id,
        session.user_id,
        session.is_admin(),
        body.parent_id,
        body.body,
    ) {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn list_companies(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Query(page): Query<PageQuery>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.list_companies(page.limit, page.offset) {
        Ok(companies) => Json(companies).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn create_company(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Json(body): Json<CreateCompanyBody>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.create_company(
        session.user_id,
        body.name,
        body.description,
        body.website,
        body.location,
    ) {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_company(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_company(&id) {
        Ok((company, rating)) => Json(CompanyResponse { company, rating }).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn put_company(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCompanyBody>,
) -> Response {
    if !session.has_permission(Permission::PostJobs) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.update_company(
        &id,
        session.user_id,
        session.is_admin(),
        body.name,
        body.description,
        body.website,
        body.location,
    ) {
        Ok(company) => Json(company).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_company_jobs(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    let filter = JobFilter {
        company_id: Some(id),
        limit: page.limit,
        offset: page.offset,
        ..Default::default()
    };
    match board_manager.list_jobs(filter, Some(session.user_id), session.is_admin()) {
        Ok(page) => Json(page).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_company_reviews(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_company_reviews(&id) {
        Ok(reviews) => Json(reviews).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn post_company_review(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
    Path(id): Path<String>,
    Json(body): Json<CreateReviewBody>,
) -> Response {
    if !session.has_permission(Permission::CommentAndReview) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.add_review(&id, session.user_id, body.rating, body.title, body.body) {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_categories(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_categories() {
        Ok(names) => Json(names).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_locations(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_locations() {
        Ok(names) => Json(names).into_response(),
        Err(err) => board_error_response(err),
    }
}

async fn get_skills(
    session: Session,
    State(board_manager): State<GuardedBoardManager>,
) -> Response {
    if !session.has_permission(Permission::BrowseBoard) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match board_manager.get_skills() {
        Ok(names) => Json(names).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(super) fn make_board_routes(state: ServerState) -> Router {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs", post(create_job))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}", put(put_job))
        .route("/jobs/{id}", axum::routing::delete(delete_job))
        .route("/jobs/{id}/publish", post(publish_job))
        .route("/jobs/{id}/close", post(close_job))
        .route("/jobs/{id}/reopen", post(reopen_job))
        .route("/jobs/{id}/apply", post(apply_to_job))
        .route("/jobs/{id}/applications", get(get_job_applications))
        .route("/jobs/{id}/comments", get(get_job_comments))
        .route("/jobs/{id}/comments", post(post_job_comment))
        .route("/companies", get(list_companies))
        .route("/companies", post(create_company))
        .route("/companies/{id}", get(get_company))
        .route("/companies/{id}", put(put_company))
        .route("/companies/{id}/jobs", get(get_company_jobs))
        .route("/companies/{id}/reviews", get(get_company_reviews))
        .route("/companies/{id}/reviews", post(post_company_review))
        .route("/categories", get(get_categories))
        .route("/locations", get(get_locations))
        .route("/skills", get(get_skills))
        .with_state(state)
}
