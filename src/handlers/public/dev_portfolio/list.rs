// GET /dev-portfolio - public dev catalog, no ownership scoping

use axum::{extract::Query, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::{self, dev_portfolio::DevItemFilter};
use crate::error::ApiError;
use crate::handlers::shared::{page_params, pagination, shape_dev_item};

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub status: Option<String>,
    pub year: Option<String>,
}

pub async fn catalog_get(Query(query): Query<CatalogQuery>) -> Result<Json<Value>, ApiError> {
    let (page, limit, offset) = page_params(query.page, query.limit);
    let filter = DevItemFilter::new(query.category, query.item_type, query.status, query.year);

    let pool = database::pool().await?;
    let (rows, total) =
        database::dev_portfolio::list_dev_items(&pool, None, &filter, limit, offset).await?;

    let items: Vec<Value> = rows.iter().map(|row| shape_dev_item(row, false)).collect();

    Ok(Json(json!({
        "items": items,
        "pagination": pagination(page, limit, total),
    })))
}
