//! Character lifecycle handlers: create, list, detail, delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::game::{CharacterDetail, CharacterSummary, GameError};
use crate::server::auth::{AuthedUser, MaybeUser};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::validation::validate_character_name;

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCharacterResponse {
    pub character_id: u64,
}

pub async fn create(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Json(body): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<CreateCharacterResponse>), ApiError> {
    let name = validate_character_name(&body.name)
        .map_err(|e| ApiError(GameError::InvalidArgument(e.to_string())))?;
    let character = state.store.create_character(&user.username, &name)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateCharacterResponse {
            character_id: character.id,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<Vec<CharacterSummary>>, ApiError> {
    Ok(Json(state.store.list_characters(&user.username)?))
}

/// Anyone may look a character up; `money` only appears for the owner.
pub async fn detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(character_id): Path<u64>,
) -> Result<Json<CharacterDetail>, ApiError> {
    let character = state.store.get_character(character_id)?;
    let is_owner = user.map(|u| u.username == character.owner).unwrap_or(false);
    Ok(Json(CharacterDetail {
        name: character.name,
        health: character.health,
        power: character.power,
        money: is_owner.then_some(character.money),
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    state.store.delete_character(character.id)?;
    Ok(Json(
        json!({ "message": format!("character '{}' deleted", character.name) }),
    ))
}
