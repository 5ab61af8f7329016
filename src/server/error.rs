use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;

use crate::game::GameError;

/// Newtype mapping domain errors onto HTTP responses so handlers can use
/// `?` directly against store calls.
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
            GameError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            GameError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GameError::Forbidden(_) => StatusCode::FORBIDDEN,
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::AlreadyExists(_)
            | GameError::InsufficientFunds { .. }
            | GameError::InsufficientQuantity { .. }
            | GameError::AlreadyEquipped(_)
            | GameError::NotEquipped(_) => StatusCode::CONFLICT,
            GameError::Sled(_)
            | GameError::Bincode(_)
            | GameError::Io(_)
            | GameError::SchemaMismatch { .. }
            | GameError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", self.0);
            // Storage faults are not the client's business.
            return (status, Json(json!({ "error": "internal error" }))).into_response();
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
