//! Item catalog CRUD. Plain I/O wrappers around the catalog tree; the
//! economy only ever reads these records.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::game::{GameError, ItemInput, ItemRecord, StatBonuses};
use crate::server::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct ItemListEntry {
    pub code: u32,
    pub name: String,
    pub price: i64,
}

impl From<ItemRecord> for ItemListEntry {
    fn from(item: ItemRecord) -> Self {
        Self {
            code: item.code,
            name: item.name,
            price: item.price,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ItemInput>,
) -> Result<(StatusCode, Json<ItemListEntry>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError(GameError::InvalidArgument(
            "item name must not be empty".to_string(),
        )));
    }
    let record = body.into_record();
    state.store.put_item(record.clone())?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ItemListEntry>>, ApiError> {
    let items = state.store.list_items()?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(code): Path<u32>,
) -> Result<Json<ItemListEntry>, ApiError> {
    Ok(Json(state.store.get_item(code)?.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub stat: Option<StatBonuses>,
    /// Present only so attempts to change it can be rejected explicitly.
    pub price: Option<i64>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(code): Path<u32>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ItemListEntry>, ApiError> {
    if body.price.is_some() {
        return Err(ApiError(GameError::InvalidArgument(
            "the price of a published item cannot be changed".to_string(),
        )));
    }
    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(ApiError(GameError::InvalidArgument(
                "item name must not be empty".to_string(),
            )));
        }
    }
    let updated = state.store.update_item(code, body.name, body.stat)?;
    Ok(Json(updated.into()))
}
