use crate::Identity;
use crate::models::UserRecord;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use ladle_kernel::prelude::{ApiError, ApiState};

/// Extractor that authenticates the request via its bearer token.
///
/// Rejects with 401 when the header is missing, malformed, or the token does
/// not resolve to an active user.
#[derive(Debug)]
pub struct CurrentUser(pub UserRecord);

impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let identity = state.try_get_slice::<Identity>()?;
        let user = identity.authenticate(token).await?;

        Ok(Self(user))
    }
}
