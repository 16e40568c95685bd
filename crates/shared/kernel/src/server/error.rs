use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;
use tracing::error;
use utoipa::ToSchema;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable description of the failure.
    pub error: String,
}

/// The error type handlers return; each variant maps to one HTTP status.
///
/// Feature crates convert their domain errors into this at the handler
/// boundary. Internal details never reach the wire: [`ApiError::Internal`]
/// responds with a generic body and logs the original message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or rejected input (400).
    #[error("{message}")]
    Validation { message: Cow<'static, str> },

    /// Missing or invalid credentials (401).
    #[error("{message}")]
    Unauthorized { message: Cow<'static, str> },

    /// Authenticated but not allowed (403).
    #[error("{message}")]
    Forbidden { message: Cow<'static, str> },

    /// The addressed resource does not exist for this caller (404).
    #[error("{message}")]
    NotFound { message: Cow<'static, str> },

    /// Upload beyond the configured size cap (413).
    #[error("{message}")]
    PayloadTooLarge { message: Cow<'static, str> },

    /// Anything unexpected (500).
    #[error("{message}")]
    Internal { message: Cow<'static, str> },
}

impl ApiError {
    /// Shorthand for a 400 with the given message.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// Shorthand for a 401 with the given message.
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    /// Shorthand for a 404 with the given message.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Shorthand for a 500 with the given message.
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal { message: message.into() }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if let Self::Internal { message } = &self {
            error!(%message, "Internal error while handling request");
            ErrorResponse { error: "Internal server error".to_owned() }
        } else {
            ErrorResponse { error: self.to_string() }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_status() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden { message: "x".into() }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::PayloadTooLarge { message: "x".into() }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::internal("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let response = ApiError::internal("secret database string").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The body is rebuilt with a generic message; the display form keeps the detail.
        assert_eq!(ApiError::internal("secret database string").to_string(), "secret database string");
    }
}
