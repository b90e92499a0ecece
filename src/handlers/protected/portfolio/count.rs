// GET /countMyPortfolioItems - total item count for the caller

use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::database;
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub async fn count_get(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = database::pool().await?;
    let total = database::portfolio::count_items(&pool, user.user_id).await?;

    Ok(Json(json!({ "total": total })))
}
