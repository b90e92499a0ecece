use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::models::dev_portfolio::DevItemRow;
use super::DatabaseError;

/// Filters for dev catalog listings. Each field is `"All"`/absent for "no
/// filter". Year arrives as a query-string token; anything non-numeric is
/// kept as a filter that matches no row rather than an error.
#[derive(Debug, Default, Clone)]
pub struct DevItemFilter {
    pub category: Option<String>,
    pub item_type: Option<String>,
    pub status: Option<String>,
    pub year: Option<i32>,
}

impl DevItemFilter {
    pub fn new(
        category: Option<String>,
        item_type: Option<String>,
        status: Option<String>,
        year: Option<String>,
    ) -> Self {
        let text = |v: Option<String>| v.filter(|s| !s.is_empty() && s != "All");
        Self {
            category: text(category),
            item_type: text(item_type),
            status: text(status),
            year: text(year).map(|y| y.parse().unwrap_or(-1)),
        }
    }
}

fn push_sep(qb: &mut QueryBuilder<'_, Postgres>, first: &mut bool) {
    if *first {
        qb.push(" WHERE ");
        *first = false;
    } else {
        qb.push(" AND ");
    }
}

/// Append `AND column = $n` only for filters actually supplied. The same
/// predicate set feeds both the count and the page query.
fn push_dev_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &DevItemFilter,
    user_id: Option<Uuid>,
) {
    let mut first = true;
    if let Some(user_id) = user_id {
        push_sep(qb, &mut first);
        qb.push("dpi.user_id = ");
        qb.push_bind(user_id);
    }
    if let Some(category) = &filter.category {
        push_sep(qb, &mut first);
        qb.push("dpi.category = ");
        qb.push_bind(category.clone());
    }
    if let Some(item_type) = &filter.item_type {
        push_sep(qb, &mut first);
        qb.push("dpi.type = ");
        qb.push_bind(item_type.clone());
    }
    if let Some(status) = &filter.status {
        push_sep(qb, &mut first);
        qb.push("dpi.status = ");
        qb.push_bind(status.clone());
    }
    if let Some(year) = filter.year {
        push_sep(qb, &mut first);
        qb.push("dpi.year = ");
        qb.push_bind(year);
    }
}

// The aggregated columns are joined with the unit separator so free-text
// values (titles end up inside alt texts) can never split out of alignment.
const DEV_ITEM_SELECT: &str = "SELECT \
    dpi.id, \
    dpi.title, \
    dpi.description, \
    dpi.category, \
    dpi.type, \
    dpi.url, \
    dpi.preview_url, \
    dpi.status, \
    dpi.year, \
    dpi.tags, \
    dpi.technologies, \
    dpi.created_at, \
    string_agg(di.url, E'\\x1f' ORDER BY di.id) AS image_urls, \
    string_agg(COALESCE(di.alt_text, ''), E'\\x1f' ORDER BY di.id) AS alt_texts, \
    string_agg(CASE WHEN di.is_primary THEN '1' ELSE '0' END, E'\\x1f' ORDER BY di.id) AS primary_flags, \
    string_agg(COALESCE(di.width::text, ''), E'\\x1f' ORDER BY di.id) AS widths, \
    string_agg(COALESCE(di.height::text, ''), E'\\x1f' ORDER BY di.id) AS heights \
    FROM dev_portfolio_items dpi \
    LEFT JOIN dev_images di ON dpi.id = di.project_id";

/// Paginated dev catalog. `user_id` is `Some` for the owner-scoped variant
/// and `None` for the public one.
pub async fn list_dev_items(
    pool: &PgPool,
    user_id: Option<Uuid>,
    filter: &DevItemFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<DevItemRow>, i64), DatabaseError> {
    let mut count_qb =
        QueryBuilder::<Postgres>::new("SELECT COUNT(DISTINCT dpi.id) FROM dev_portfolio_items dpi");
    push_dev_filters(&mut count_qb, filter, user_id);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut items_qb = QueryBuilder::<Postgres>::new(DEV_ITEM_SELECT);
    push_dev_filters(&mut items_qb, filter, user_id);
    items_qb.push(" GROUP BY dpi.id ORDER BY dpi.created_at DESC LIMIT ");
    items_qb.push_bind(limit);
    items_qb.push(" OFFSET ");
    items_qb.push_bind(offset);

    let rows = items_qb
        .build_query_as::<DevItemRow>()
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

pub async fn fetch_dev_item(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<DevItemRow>, DatabaseError> {
    let mut qb = QueryBuilder::<Postgres>::new(DEV_ITEM_SELECT);
    qb.push(" WHERE dpi.id = ");
    qb.push_bind(id);
    qb.push(" GROUP BY dpi.id");

    let row = qb
        .build_query_as::<DevItemRow>()
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_id_by_title(
    tx: &mut Transaction<'_, Postgres>,
    title: &str,
) -> Result<Option<Uuid>, DatabaseError> {
    let id = sqlx::query_scalar("SELECT id FROM dev_portfolio_items WHERE title = $1")
        .bind(title)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(id)
}

pub struct NewDevItem<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub item_type: &'a str,
    pub url: Option<&'a str>,
    pub preview_url: Option<&'a str>,
    pub status: &'a str,
    pub year: i32,
    pub tags: Vec<String>,
    pub technologies: Vec<String>,
    pub user_id: Uuid,
}

pub async fn insert_dev_item(
    tx: &mut Transaction<'_, Postgres>,
    item: &NewDevItem<'_>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO dev_portfolio_items \
         (id, title, description, category, type, url, preview_url, status, year, tags, technologies, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(item.id)
    .bind(item.title)
    .bind(item.description)
    .bind(item.category)
    .bind(item.item_type)
    .bind(item.url)
    .bind(item.preview_url)
    .bind(item.status)
    .bind(item.year)
    .bind(serde_json::json!(item.tags))
    .bind(serde_json::json!(item.technologies))
    .bind(item.user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Duplicate detection is by original filename, scoped to the in-progress
/// item, not globally.
pub async fn find_image_by_filename(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    original_filename: &str,
) -> Result<Option<Uuid>, DatabaseError> {
    let id = sqlx::query_scalar(
        "SELECT id FROM dev_images WHERE project_id = $1 AND original_filename = $2",
    )
    .bind(project_id)
    .bind(original_filename)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(id)
}

pub struct NewDevImage<'a> {
    pub project_id: Uuid,
    pub url: &'a str,
    pub original_filename: &'a str,
    pub alt_text: &'a str,
    pub is_primary: bool,
    pub width: i32,
    pub height: i32,
    pub size: i64,
    pub format: &'a str,
    pub public_id: &'a str,
}

pub async fn insert_dev_image(
    tx: &mut Transaction<'_, Postgres>,
    image: &NewDevImage<'_>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO dev_images \
         (id, project_id, url, original_filename, alt_text, is_primary, width, height, size, format, public_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(Uuid::new_v4())
    .bind(image.project_id)
    .bind(image.url)
    .bind(image.original_filename)
    .bind(image.alt_text)
    .bind(image.is_primary)
    .bind(image.width)
    .bind(image.height)
    .bind(image.size)
    .bind(image.format)
    .bind(image.public_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_normalizes_all_tokens() {
        let f = DevItemFilter::new(
            Some("All".into()),
            Some("Web App".into()),
            None,
            Some("2023".into()),
        );
        assert!(f.category.is_none());
        assert_eq!(f.item_type.as_deref(), Some("Web App"));
        assert!(f.status.is_none());
        assert_eq!(f.year, Some(2023));
    }

    #[test]
    fn malformed_year_matches_nothing() {
        let f = DevItemFilter::new(None, None, None, Some("twenty23".into()));
        assert_eq!(f.year, Some(-1));
    }

    #[test]
    fn filters_append_only_supplied_predicates() {
        let f = DevItemFilter::new(None, None, Some("active".into()), None);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM dev_portfolio_items dpi");
        push_dev_filters(&mut qb, &f, None);
        let sql = qb.into_sql();
        assert!(sql.contains("WHERE dpi.status = "));
        assert!(!sql.contains("dpi.category"));
        assert!(!sql.contains("dpi.user_id"));
        assert!(!sql.contains(" AND "));
    }

    #[test]
    fn user_scope_is_first_predicate() {
        let f = DevItemFilter::new(Some("Web".into()), None, None, None);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM dev_portfolio_items dpi");
        push_dev_filters(&mut qb, &f, Some(Uuid::new_v4()));
        let sql = qb.into_sql();
        assert!(sql.contains("WHERE dpi.user_id = "));
        assert!(sql.contains(" AND dpi.category = "));
    }
}
