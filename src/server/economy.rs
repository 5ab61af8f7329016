//! Economy operation handlers. Each one resolves the acting character
//! through the ownership gate, then invokes exactly one coordinator
//! operation; the coordinator owns all economic invariants.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::game::{GrantReceipt, InventoryLine, OrderLine, StatSummary};
use crate::server::auth::AuthedUser;
use crate::server::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub remaining_balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct ItemCodeRequest {
    pub code: u32,
}

pub async fn grant(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
) -> Result<Json<GrantReceipt>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    Ok(Json(state.store.grant_currency(character.id)?))
}

pub async fn buy(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
    Json(body): Json<OrderRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    let remaining_balance = state.store.buy_items(character.id, &body.items)?;
    Ok(Json(BalanceResponse { remaining_balance }))
}

pub async fn sell(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
    Json(body): Json<OrderRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    let remaining_balance = state.store.sell_items(character.id, &body.items)?;
    Ok(Json(BalanceResponse { remaining_balance }))
}

pub async fn equip(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
    Json(body): Json<ItemCodeRequest>,
) -> Result<Json<StatSummary>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    Ok(Json(state.store.equip_item(character.id, body.code)?))
}

pub async fn unequip(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
    Json(body): Json<ItemCodeRequest>,
) -> Result<Json<StatSummary>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    Ok(Json(state.store.unequip_item(character.id, body.code)?))
}

pub async fn inventory(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    Path(character_id): Path<u64>,
) -> Result<Json<Vec<InventoryLine>>, ApiError> {
    let character = state.store.resolve_character(character_id, &user.username)?;
    Ok(Json(state.store.get_inventory(character.id)?))
}
