use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::errors::AppError;

pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Exact, case-sensitive token comparison in constant time.
/// An unconfigured secret never matches.
pub fn tokens_match(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(p), Some(e)) => bool::from(p.as_bytes().ct_eq(e.as_bytes())),
        _ => false,
    }
}

/// Compares the media type of `Content-Type`, ignoring parameters such as
/// `charset` and letter case.
pub fn has_content_type(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// Validates `X-API-Token` against the configured API token.
/// Rejections are plain 400s so the endpoint does not advertise auth.
pub fn check_api_token(headers: &HeaderMap, config: &Config) -> Result<(), AppError> {
    let provided = headers.get(API_TOKEN_HEADER).and_then(|v| v.to_str().ok());

    if tokens_match(provided, config.api_token.as_deref()) {
        return Ok(());
    }

    // Never log either token value
    if config.api_token.is_none() {
        tracing::warn!("gate api: API_TOKEN is not configured, rejecting request");
    } else if provided.is_none() {
        tracing::warn!("gate api: missing X-API-Token header");
    } else {
        tracing::warn!("gate api: invalid X-API-Token");
    }
    Err(AppError::bad_request("api token mismatch"))
}
