//! Seam for the external authorization boundary.
//!
//! Authentication itself happens upstream; the proxy in front of this service
//! authenticates the caller and forwards their id in `X-User-Id`. Every
//! handler that touches user data goes through this extractor, so a write can
//! never reach the ledger without an authenticated owner id attached.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}
