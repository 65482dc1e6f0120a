use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName};
use subtle::ConstantTimeEq;

use crate::http::AppError;
use crate::AppState;

const ADMIN_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-admin-token");

/// Present in a handler's arguments when the caller proved it operates the
/// wall. Visitors never hold it, so routes taking it are closed to them.
#[derive(Debug, Clone)]
pub struct AdminToken;

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn tokens_match(presented: &str, configured: &str) -> bool {
    presented.as_bytes().ct_eq(configured.as_bytes()).into()
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(configured) = state.admin_token.as_deref() else {
            return Err(AppError::forbidden("admin token not configured"));
        };

        let Some(presented) = presented_token(&parts.headers) else {
            return Err(AppError::forbidden("missing admin token"));
        };

        if !tokens_match(presented, configured) {
            tracing::warn!(path = %parts.uri.path(), "rejected admin token");
            return Err(AppError::forbidden("invalid admin token"));
        }

        Ok(AdminToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn blank_header_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static("   "));
        assert_eq!(presented_token(&headers), None);

        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static(" secret "));
        assert_eq!(presented_token(&headers), Some("secret"));
    }

    #[test]
    fn comparison_is_exact() {
        assert!(tokens_match("secret", "secret"));
        assert!(!tokens_match("secret", "secret2"));
        assert!(!tokens_match("Secret", "secret"));
        assert!(!tokens_match("", "secret"));
    }
}
