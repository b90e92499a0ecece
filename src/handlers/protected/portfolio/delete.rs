// POST /deleteItem - remove an item and its dependent rows, owner-scoped.
// The item delete and both child deletes run in one transaction, so a
// failure mid-sequence leaves no orphaned rows.

use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database;
use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "itemId")]
    pub item_id: Option<String>,
}

pub async fn delete_post(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let item_id = payload
        .item_id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request("Item ID is required"))?;
    let item_id =
        Uuid::parse_str(&item_id).map_err(|_| ApiError::bad_request("Invalid item ID"))?;

    let pool = database::pool().await?;
    let mut tx = pool.begin().await?;

    let affected = database::portfolio::delete_item(&mut tx, item_id, user.user_id).await?;
    if affected == 0 {
        // Covers both "does not exist" and "not owned by caller"
        tx.rollback().await?;
        return Err(ApiError::not_found("Item not found"));
    }

    database::portfolio::delete_item_children(&mut tx, item_id).await?;
    tx.commit().await?;

    tracing::info!("Deleted portfolio item {} for user {}", item_id, user.user_id);

    Ok(Json(json!({ "message": "Item deleted successfully" })))
}
