//! Maps domain rejections onto HTTP responses.
//!
//! Every failure surfaces a machine-readable reason code alongside the
//! human-readable message, so a moderator UI can explain why an action was
//! refused.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use grimoire_domain::GameError;

#[derive(Debug)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::NotFound { .. } => StatusCode::NOT_FOUND,
            GameError::RoleMismatch { .. } => StatusCode::CONFLICT,
            GameError::Configuration(_)
            | GameError::InvalidOperation(_)
            | GameError::UnknownRole(_) => StatusCode::BAD_REQUEST,
        };
        let body = json!({
            "error": self.0.code(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_its_code() {
        let err = ApiError(GameError::not_found("room", "abc"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_operation_maps_to_400() {
        let err = ApiError(GameError::invalid_operation("seat occupied"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
