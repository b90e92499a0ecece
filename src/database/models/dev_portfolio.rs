use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One dev listing row from the grouped query. The aggregated columns are
/// parallel separator-joined lists ordered by image id, so index `n` of
/// each column describes the same image.
#[derive(Debug, Clone, FromRow)]
pub struct DevItemRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    #[sqlx(rename = "type")]
    pub item_type: String,
    pub url: Option<String>,
    pub preview_url: Option<String>,
    pub status: String,
    pub year: i32,
    pub tags: serde_json::Value,
    pub technologies: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub image_urls: Option<String>,
    pub alt_texts: Option<String>,
    pub primary_flags: Option<String>,
    pub widths: Option<String>,
    pub heights: Option<String>,
}
