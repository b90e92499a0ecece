//! Result shaping shared by the listing workflows.

use serde::Serialize;

/// Pagination metadata, always derived from the same predicate set as the
/// page itself: `totalPages == ceil(totalItems / itemsPerPage)`.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

pub fn pagination(page: i64, limit: i64, total: i64) -> Pagination {
    Pagination {
        current_page: page,
        total_pages: (total + limit - 1) / limit,
        total_items: total,
        items_per_page: limit,
    }
}

/// Normalize `page`/`limit` query params (defaults 1/8) into
/// `(page, limit, offset)`.
pub fn page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(8).max(1);
    (page, limit, (page - 1) * limit)
}

/// Split a comma-separated form value into trimmed, non-empty entries
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// One image descriptor in a listing or upload response
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImageJson {
    pub url: String,
    pub alt_text: String,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

/// Separator used by the grouped dev queries when concatenating image
/// columns. The unit separator cannot occur in urls or alt texts, so values
/// containing commas never split out of alignment.
pub const AGG_SEP: char = '\u{1f}';

/// Re-zip the parallel separator-concatenated columns of a grouped listing
/// row back into discrete image objects. Index `n` of each list describes
/// the same image; entries with an empty url token are dropped.
pub fn flatten_images(
    title: &str,
    urls: Option<&str>,
    alt_texts: Option<&str>,
    primary_flags: Option<&str>,
    widths: Option<&str>,
    heights: Option<&str>,
    include_dims: bool,
) -> Vec<ImageJson> {
    let Some(urls) = urls else {
        return Vec::new();
    };

    fn split(v: Option<&str>) -> Vec<&str> {
        v.map(|s| s.split(AGG_SEP).collect()).unwrap_or_default()
    }
    let alt_texts = split(alt_texts);
    let primary_flags = split(primary_flags);
    let widths = split(widths);
    let heights = split(heights);

    let mut images = Vec::new();
    for (index, url) in urls.split(AGG_SEP).enumerate() {
        if url.is_empty() || url == "null" {
            continue;
        }
        let alt_text = alt_texts
            .get(index)
            .filter(|alt| !alt.is_empty())
            .map(|alt| (*alt).to_string())
            .unwrap_or_else(|| format!("{} - Image {}", title, index + 1));
        let dim = |values: &[&str]| {
            include_dims
                .then(|| values.get(index).and_then(|v| v.parse().ok()))
                .flatten()
        };
        images.push(ImageJson {
            url: url.to_string(),
            alt_text,
            is_primary: primary_flags.get(index).copied() == Some("1"),
            width: dim(&widths),
            height: dim(&heights),
        });
    }
    images
}

/// Shape one grouped dev listing row into its response object. Dimensions
/// are only included in the single-item view.
pub fn shape_dev_item(row: &crate::database::models::DevItemRow, include_dims: bool) -> serde_json::Value {
    let images = flatten_images(
        &row.title,
        row.image_urls.as_deref(),
        row.alt_texts.as_deref(),
        row.primary_flags.as_deref(),
        row.widths.as_deref(),
        row.heights.as_deref(),
        include_dims,
    );

    serde_json::json!({
        "id": row.id,
        "title": row.title,
        "description": row.description.clone().unwrap_or_default(),
        "category": row.category,
        "type": row.item_type,
        "url": row.url.clone().unwrap_or_default(),
        "previewUrl": row.preview_url.clone().unwrap_or_default(),
        "status": row.status,
        "year": row.year,
        "tags": row.tags,
        "technologies": row.technologies,
        "images": images,
        "createdAt": row.created_at,
    })
}
