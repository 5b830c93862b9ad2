use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Caller identity taken from the `X-User-Id` header.
///
/// Use `AuthUser` on routes that require a user (401 when absent) and
/// `Option<AuthUser>` where the user is optional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|user_id| Self { user_id: user_id.to_string() })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or_else(|| ApiError::unauthorized("User ID required"))
    }
}

/// Rejects requests whose `X-Admin-Key` does not match `security.admin_key`.
pub async fn admin_key_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let supplied = headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !admin_key_matches(supplied, &state.config.security.admin_key) {
        tracing::warn!("Rejected privileged request: invalid admin key");
        return Err(ApiError::forbidden("Forbidden: Invalid admin key"));
    }

    Ok(next.run(request).await)
}

/// Compare digests so the check does not short-circuit on the key itself.
/// An empty configured key never matches.
pub fn admin_key_matches(supplied: &str, expected: &str) -> bool {
    if expected.is_empty() || supplied.is_empty() {
        return false;
    }
    Sha256::digest(supplied.as_bytes()) == Sha256::digest(expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn user_id_is_trimmed_and_required() {
        let mut headers = HeaderMap::new();
        assert_eq!(AuthUser::from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("   "));
        assert_eq!(AuthUser::from_headers(&headers), None);

        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" reader-42 "));
        assert_eq!(AuthUser::from_headers(&headers).map(|u| u.user_id), Some("reader-42".to_string()));
    }

    #[test]
    fn admin_key_comparison() {
        assert!(admin_key_matches("secret", "secret"));
        assert!(!admin_key_matches("secret ", "secret"));
        assert!(!admin_key_matches("", "secret"));
        assert!(!admin_key_matches("", ""));
    }
}
