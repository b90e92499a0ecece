// GET /getDevPortfolioItems - owner-scoped dev listing with full filters

use axum::{extract::Query, Extension, Json};
use serde_json::{json, Value};

use crate::database::{self, dev_portfolio::DevItemFilter};
use crate::error::ApiError;
use crate::handlers::public::dev_portfolio::list::CatalogQuery;
use crate::handlers::shared::{page_params, pagination, shape_dev_item};
use crate::middleware::AuthUser;

pub async fn list_get(
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Value>, ApiError> {
    let (page, limit, offset) = page_params(query.page, query.limit);
    let filter = DevItemFilter::new(query.category, query.item_type, query.status, query.year);

    let pool = database::pool().await?;
    let (rows, total) =
        database::dev_portfolio::list_dev_items(&pool, Some(user.user_id), &filter, limit, offset)
            .await?;

    let items: Vec<Value> = rows.iter().map(|row| shape_dev_item(row, false)).collect();

    Ok(Json(json!({
        "items": items,
        "pagination": pagination(page, limit, total),
    })))
}
