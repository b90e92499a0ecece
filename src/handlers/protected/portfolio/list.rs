// GET /getMyPortfolioItems - owner-scoped generic listing

use axum::{extract::Query, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::{self, portfolio::ItemFilter};
use crate::error::ApiError;
use crate::handlers::shared::{page_params, pagination, split_list};
use crate::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
}

pub async fn list_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let (page, limit, offset) = page_params(query.page, query.limit);
    let filter = ItemFilter::new(query.category);

    let pool = database::pool().await?;
    let (rows, total) =
        database::portfolio::list_items(&pool, user.user_id, &filter, limit, offset).await?;

    let items: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "id": row.id,
                "title": row.title,
                "category": row.category,
                "description": row.description.clone().unwrap_or_default(),
                "tags": split_list(row.tags.as_deref()),
                "images": split_list(row.images.as_deref()),
            })
        })
        .collect();

    Ok(Json(json!({
        "items": items,
        "pagination": pagination(page, limit, total),
    })))
}
