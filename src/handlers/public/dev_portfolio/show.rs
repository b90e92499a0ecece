// GET /dev-portfolio/:id - single public dev item, dimensions included

use axum::{extract::Path, Json};
use serde_json::Value;
use uuid::Uuid;

use crate::database;
use crate::error::ApiError;
use crate::handlers::shared::shape_dev_item;

pub async fn catalog_show(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    // A non-UUID path segment can never name an item
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::not_found("Development portfolio item not found"))?;

    let pool = database::pool().await?;
    let row = database::dev_portfolio::fetch_dev_item(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Development portfolio item not found"))?;

    Ok(Json(shape_dev_item(&row, true)))
}
