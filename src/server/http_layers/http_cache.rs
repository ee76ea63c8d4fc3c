//! Cache-control middleware for public board reads

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};

/// Stamps successful GET responses with a max-age so browsers and proxies
/// can reuse board listings. A zero age disables the header entirely.
pub async fn http_cache(
    State(max_age_sec): State<usize>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let cacheable = request.method() == Method::GET && max_age_sec > 0;
    let mut response = next.run(request).await;
    if cacheable && response.status().is_success() {
        if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", max_age_sec)) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }
    response
}
