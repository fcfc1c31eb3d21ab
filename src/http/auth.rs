use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;

use crate::http::AppError;
use crate::AppState;

/// Proof that the caller presented the configured admin token.
#[derive(Debug, Clone)]
pub struct AdminToken;

pub const ADMIN_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-admin-token");

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state
            .admin_token
            .as_ref()
            .ok_or_else(|| AppError::forbidden("admin token not configured"))?;

        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::forbidden("missing admin token"))?;

        if provided != expected {
            return Err(AppError::forbidden("invalid admin token"));
        }

        Ok(AdminToken)
    }
}
