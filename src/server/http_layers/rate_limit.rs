//! Rate limiting middleware using tower-governor
//!
//! IP-based limiting on the login endpoint (brute-force protection) and
//! user-or-IP limiting on the rest of the API.

use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tower_governor::{key_extractor::KeyExtractor, GovernorError};
use tracing::warn;

use super::super::metrics::record_rate_limit_hit;

/// Login attempts: one replenished every LOGIN_REPLENISH_SECONDS, bursting
/// up to LOGIN_BURST. Strict on purpose, argon2 work is expensive.
pub const LOGIN_REPLENISH_SECONDS: u64 = 6;
pub const LOGIN_BURST: u32 = 10;

/// Extracts IP address from ConnectInfo for IP-based rate limiting
#[derive(Clone)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = SocketAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Logs and counts rate limit violations, answers 429.
pub fn rate_limit_error_handler(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { .. } => {
            warn!("Rate limit exceeded");
            record_rate_limit_hit("api");
            StatusCode::TOO_MANY_REQUESTS.into_response()
        }
        _ => {
            warn!("Rate limiting error: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// Note: governor configuration builders are inlined in server.rs, their
// full type signatures are unwieldy. The constants above define the limits.
