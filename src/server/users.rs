//! Registration and login handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::GameError;
use crate::server::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    /// Display name shown to other players.
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub username: String,
    pub name: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    if body.password != body.confirm_password {
        return Err(ApiError(GameError::InvalidArgument(
            "passwords do not match".to_string(),
        )));
    }
    let user = state
        .store
        .register_user(&body.username, &body.password, &body.name)?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            username: user.username,
            name: user.display_name,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = state.store.login(&body.username, &body.password)?;
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}
