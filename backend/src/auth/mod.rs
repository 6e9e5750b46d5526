use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use log::{info, warn};

use crate::error::AppError;
use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// True when `provided` equals the configured secret. No secret configured means no admin access.
pub fn admin_key_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match (expected, provided) {
        (Some(expected), Some(provided)) => constant_time_eq(expected.as_bytes(), provided.as_bytes()),
        _ => false,
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Guards admin routes. Runs before the body is read, so a bad key is a 401 whatever the payload.
pub async fn require_admin_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if !admin_key_matches(state.admin_key.as_deref(), provided) {
        warn!(
            "Rejected admin request to {} (key {})",
            request.uri().path(),
            if provided.is_some() { "mismatched" } else { "missing" }
        );
        return Err(AppError::Unauthorized);
    }
    info!("Authorized admin request to {}", request.uri().path());
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_key_is_accepted() {
        assert!(admin_key_matches(Some("s3cret"), Some("s3cret")));
    }

    #[test]
    fn wrong_or_missing_key_is_rejected() {
        assert!(!admin_key_matches(Some("s3cret"), Some("s3cre")));
        assert!(!admin_key_matches(Some("s3cret"), Some("S3CRET")));
        assert!(!admin_key_matches(Some("s3cret"), None));
    }

    #[test]
    fn unconfigured_secret_rejects_everything() {
        assert!(!admin_key_matches(None, Some("")));
        assert!(!admin_key_matches(None, Some("anything")));
        assert!(!admin_key_matches(None, None));
    }
}
