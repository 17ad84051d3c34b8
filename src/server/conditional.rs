//! Conditional GET: version as `ETag`, next scheduled update as `max-age`

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};

/// Seconds a client should wait before polling again.
///
/// Never below `minimum`, even when the scheduled update is overdue.
pub fn cache_max_age(
    next_client_update: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    minimum: Duration,
) -> i64 {
    let floor = minimum.num_seconds();
    match next_client_update {
        Some(next) => {
            let remaining = (next - now).num_milliseconds() as f64 / 1000.0;
            floor.max(remaining.round() as i64)
        }
        None => floor,
    }
}

/// Version the client already holds.
///
/// Older firmware sends it in an `ETag` request header instead of
/// `If-None-Match`.
pub fn client_validator(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(IF_NONE_MATCH)
        .or_else(|| headers.get(ETAG))
        .and_then(|v| v.to_str().ok())
}

/// Answer an image request; 304 when the validator equals `version` exactly
pub fn image_response(
    version: &str,
    image: Vec<u8>,
    max_age: i64,
    validator: Option<&str>,
) -> Response {
    let not_modified = validator == Some(version);
    let (status, body) = if not_modified {
        (StatusCode::NOT_MODIFIED, Body::empty())
    } else {
        (StatusCode::OK, Body::from(image))
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    if let Ok(etag) = HeaderValue::from_str(version) {
        headers.insert(ETAG, etag);
    }
    if let Ok(cache_control) = HeaderValue::from_str(&format!("max-age={}", max_age)) {
        headers.insert(CACHE_CONTROL, cache_control);
    }
    if !not_modified {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
    }
    response
}
