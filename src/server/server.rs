use anyhow::Result;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::{debug, error, info};

use crate::applications::ApplicationManager;
use crate::board::{BoardManager, BoardStore};
use crate::user::auth::AuthTokenValue;
use crate::user::{FullUserStore, UserManager, UserRole};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::State,
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use super::account_routes::make_account_routes;
use super::admin_routes::make_admin_routes;
use super::application_routes::make_application_routes;
use super::board_routes::make_board_routes;
use super::community_routes::make_community_routes;
use super::http_layers::{
    http_cache, log_requests, rate_limit_error_handler, IpKeyExtractor, LOGIN_BURST,
    LOGIN_REPLENISH_SECONDS,
};
use super::metrics::{self, record_login_attempt};
use super::session::Session;
use super::state::*;
use super::ServerConfig;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub user_handle: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct RegisterBody {
    pub user_handle: String,
    pub password: String,
    pub role: String,
}

#[derive(Serialize)]
struct RegisterSuccessResponse {
    user_id: usize,
}

#[derive(Serialize)]
struct SessionInfoResponse {
    user_id: usize,
    handle: Option<String>,
    roles: Vec<UserRole>,
    permissions: Vec<crate::user::Permission>,
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    let start = Instant::now();
    let locked_manager = user_manager.lock().unwrap();

    let credentials = match locked_manager.get_user_credentials(&body.user_handle) {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            record_login_attempt("unknown_user", start.elapsed());
            return StatusCode::FORBIDDEN.into_response();
        }
        Err(err) => {
            error!("Error loading credentials: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let Some(password_credentials) = &credentials.username_password else {
        record_login_attempt("no_password", start.elapsed());
        return StatusCode::FORBIDDEN.into_response();
    };

    match password_credentials.hasher.verify(
        body.password.as_str(),
        password_credentials.hash.as_str(),
        password_credentials.salt.as_str(),
    ) {
        Ok(true) => {}
        _ => {
            record_login_attempt("wrong_password", start.elapsed());
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    match locked_manager.generate_auth_token(&credentials) {
        Ok(auth_token) => {
            record_login_attempt("success", start.elapsed());
            let response_body = LoginSuccessResponse {
                token: auth_token.value.0.clone(),
            };
            let response_body = serde_json::to_string(&response_body).unwrap();

            let cookie_value = HeaderValue::from_str(&format!(
                "session_token={}; Path=/; HttpOnly",
                auth_token.value.0
            ))
            .unwrap();
            response::Builder::new()
                .status(StatusCode::CREATED)
                .header(axum::http::header::SET_COOKIE, cookie_value)
                .body(Body::from(response_body))
                .unwrap()
        }
        Err(err) => {
            error!("Error with auth token generation: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<RegisterBody>,
) -> Response {
    let Some(role) = UserRole::from_str(&body.role) else {
        return (
            StatusCode::BAD_REQUEST,
            format!("Unknown role '{}'.", body.role),
        )
            .into_response();
    };
    if role == UserRole::Admin {
        return (
            StatusCode::BAD_REQUEST,
            "The Admin role cannot be self-assigned.".to_string(),
        )
            .into_response();
    }

    let locked_manager = user_manager.lock().unwrap();
    match locked_manager.get_user_id(&body.user_handle) {
        Ok(Some(_)) => return StatusCode::CONFLICT.into_response(),
        Ok(None) => {}
        Err(err) => {
            error!("Error checking handle availability: {}", err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    match locked_manager.register_user(&body.user_handle, body.password, role) {
        Ok(user_id) => {
            info!("Registered user '{}' as {:?}", body.user_handle, role);
            (
                StatusCode::CREATED,
                Json(RegisterSuccessResponse { user_id }),
            )
                .into_response()
        }
        Err(err) => (StatusCode::BAD_REQUEST, format!("{}", err)).into_response(),
    }
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    let locked_manager = user_manager.lock().unwrap();
    match locked_manager.delete_auth_token(session.user_id, &AuthTokenValue(session.token)) {
        Ok(()) => {
            let cookie_value = Cookie::build(Cookie::new("session_token", ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
                .unwrap()
        }
        Err(err) => {
            debug!("Logout failed: {}", err);
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}

async fn get_session(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> Response {
    let locked_manager = user_manager.lock().unwrap();
    let handle = locked_manager.get_user_handle(session.user_id).ok().flatten();
    let roles = locked_manager
        .get_user_roles(session.user_id)
        .unwrap_or_default();
    Json(SessionInfoResponse {
        user_id: session.user_id,
        handle,
        roles,
        permissions: session.permissions,
    })
    .into_response()
}

pub fn make_app(
    config: ServerConfig,
    board_store: Arc<dyn BoardStore>,
    user_store: Arc<dyn FullUserStore>,
) -> Result<Router> {
    let user_manager = Arc::new(Mutex::new(UserManager::new(
        board_store.clone(),
        user_store.clone(),
    )));
    let board_manager = Arc::new(BoardManager::new(board_store.clone(), user_store.clone()));
    let application_manager = Arc::new(ApplicationManager::new(
        board_store.clone(),
        user_store.clone(),
    ));

    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        user_manager,
        board_manager,
        application_manager,
        user_store,
        hash: option_env!("GIT_HASH").unwrap_or("unknown").to_owned(),
    };

    let login_governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(IpKeyExtractor)
            .per_second(LOGIN_REPLENISH_SECONDS)
            .burst_size(LOGIN_BURST)
            .finish()
            .expect("Invalid login governor configuration"),
    );
    let login_routes: Router = Router::new()
        .route("/login", post(login))
        .layer(GovernorLayer::new(login_governor_config).error_handler(rate_limit_error_handler))
        .with_state(state.clone());

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/logout", get(logout))
        .route("/session", get(get_session))
        .with_state(state.clone())
        .merge(login_routes);

    let board_routes = make_board_routes(state.clone()).layer(middleware::from_fn_with_state(
        config.content_cache_age_sec,
        http_cache,
    ));

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/board", board_routes)
        .nest("/v1/applications", make_application_routes(state.clone()))
        .nest("/v1/account", make_account_routes(state.clone()))
        .nest("/v1/admin", make_admin_routes(state.clone()))
        .nest("/v1", make_community_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

async fn run_metrics_server(port: u16) -> Result<()> {
    let app = Router::new().route("/metrics", get(metrics::metrics_handler));
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    Ok(axum::serve(listener, app).await?)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    board_store: Arc<dyn BoardStore>,
    user_store: Arc<dyn FullUserStore>,
    requests_logging_level: super::RequestsLoggingLevel,
    port: u16,
    metrics_port: u16,
    content_cache_age_sec: usize,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        content_cache_age_sec,
        frontend_dir_path,
    };
    let app = make_app(config, board_store, user_store)?;

    tokio::spawn(async move {
        if let Err(err) = run_metrics_server(metrics_port).await {
            error!("Metrics server failed: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    Ok(axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SqliteBoardStore;
    use crate::user::SqliteUserStore;
    use axum::{body::Body, http::Request};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        let board_store: Arc<dyn BoardStore> =
            Arc::new(SqliteBoardStore::new(dir.path().join("board.db")).unwrap());
        let user_store: Arc<dyn FullUserStore> =
            Arc::new(SqliteUserStore::new(dir.path().join("user.db")).unwrap());
        let app = make_app(ServerConfig::default(), board_store, user_store).unwrap();
        (dir, app)
    }

    #[tokio::test]
    async fn responds_forbidden_on_protected_routes() {
        let (_dir, app) = test_app();

        let protected_routes = vec![
            "/v1/board/jobs",
            "/v1/board/jobs/123",
            "/v1/board/jobs/123/comments",
            "/v1/board/companies",
            "/v1/board/companies/123",
            "/v1/board/companies/123/reviews",
            "/v1/board/categories",
            "/v1/applications",
            "/v1/account/profile",
            "/v1/account/saved",
            "/v1/account/follows",
            "/v1/account/notifications",
            "/v1/admin/users",
            "/v1/admin/stats",
            "/v1/auth/logout",
        ];

        for route in protected_routes.into_iter() {
            let request = Request::builder().uri(route).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::FORBIDDEN,
                "route {} should be protected",
                route
            );
        }
    }

    #[tokio::test]
    async fn home_responds_without_session() {
        let (_dir, app) = test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(86_400 + 3661)),
            "1d 01:01:01"
        );
    }
}
