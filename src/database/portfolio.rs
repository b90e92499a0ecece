use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::models::portfolio::PortfolioItemRow;
use super::DatabaseError;

/// Filters for the owner-scoped listing. `"All"` or absent means no filter.
#[derive(Debug, Default, Clone)]
pub struct ItemFilter {
    pub category: Option<String>,
}

impl ItemFilter {
    pub fn new(category: Option<String>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty() && c != "All"),
        }
    }
}

/// Count and page queries share the same predicate set so pagination metadata
/// always agrees with the returned page.
pub async fn list_items(
    pool: &PgPool,
    user_id: Uuid,
    filter: &ItemFilter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<PortfolioItemRow>, i64), DatabaseError> {
    let mut count_qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(DISTINCT pi.item_id) \
         FROM portfolio_items pi \
         LEFT JOIN categories c ON pi.category_id = c.category_id \
         WHERE pi.user_id = ",
    );
    count_qb.push_bind(user_id);
    push_category_filter(&mut count_qb, filter);

    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut items_qb = QueryBuilder::<Postgres>::new(
        "SELECT \
            pi.item_id AS id, \
            pi.title, \
            pi.description, \
            c.name AS category, \
            string_agg(DISTINCT t.name, ',') AS tags, \
            string_agg(DISTINCT i.url, ',') AS images \
         FROM portfolio_items pi \
         LEFT JOIN categories c ON pi.category_id = c.category_id \
         LEFT JOIN item_tags it ON pi.item_id = it.item_id \
         LEFT JOIN tags t ON it.tag_id = t.tag_id \
         LEFT JOIN images i ON pi.item_id = i.item_id \
         WHERE pi.user_id = ",
    );
    items_qb.push_bind(user_id);
    push_category_filter(&mut items_qb, filter);
    items_qb.push(" GROUP BY pi.item_id, c.name ORDER BY pi.created_at DESC LIMIT ");
    items_qb.push_bind(limit);
    items_qb.push(" OFFSET ");
    items_qb.push_bind(offset);

    let rows = items_qb
        .build_query_as::<PortfolioItemRow>()
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

fn push_category_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    if let Some(category) = &filter.category {
        qb.push(" AND c.name = ");
        qb.push_bind(category.clone());
    }
}

pub async fn count_items(pool: &PgPool, user_id: Uuid) -> Result<i64, DatabaseError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM portfolio_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Advisory duplicate check, exact title match across all users.
pub async fn find_id_by_title(
    tx: &mut Transaction<'_, Postgres>,
    title: &str,
) -> Result<Option<Uuid>, DatabaseError> {
    let id = sqlx::query_scalar("SELECT item_id FROM portfolio_items WHERE title = $1")
        .bind(title)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(id)
}

pub async fn get_or_create_category(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<Uuid, DatabaseError> {
    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT category_id FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut **tx)
            .await?;

    if let Some(category_id) = existing {
        return Ok(category_id);
    }

    let category_id = Uuid::new_v4();
    sqlx::query("INSERT INTO categories (category_id, name, slug) VALUES ($1, $2, $3)")
        .bind(category_id)
        .bind(name)
        .bind(slugify(name))
        .execute(&mut **tx)
        .await?;
    Ok(category_id)
}

pub async fn get_or_create_tag(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<Uuid, DatabaseError> {
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT tag_id FROM tags WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(tag_id) = existing {
        return Ok(tag_id);
    }

    let tag_id = Uuid::new_v4();
    sqlx::query("INSERT INTO tags (tag_id, name, slug) VALUES ($1, $2, $3)")
        .bind(tag_id)
        .bind(name)
        .bind(slugify(name))
        .execute(&mut **tx)
        .await?;
    Ok(tag_id)
}

pub async fn link_tag(
    tx: &mut Transaction<'_, Postgres>,
    item_id: Uuid,
    tag_id: Uuid,
) -> Result<(), DatabaseError> {
    sqlx::query("INSERT INTO item_tags (item_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(item_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    item_id: Uuid,
    title: &str,
    description: Option<&str>,
    category_id: Uuid,
    user_id: Uuid,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO portfolio_items (item_id, title, description, category_id, slug, user_id) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(item_id)
    .bind(title)
    .bind(description)
    .bind(category_id)
    .bind(slugify(title))
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_image(
    tx: &mut Transaction<'_, Postgres>,
    item_id: Uuid,
    url: &str,
    alt_text: &str,
    is_primary: bool,
    width: i32,
    height: i32,
    size: i64,
    format: &str,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO images (image_id, item_id, url, alt_text, is_primary, width, height, size, format) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(Uuid::new_v4())
    .bind(item_id)
    .bind(url)
    .bind(alt_text)
    .bind(is_primary)
    .bind(width)
    .bind(height)
    .bind(size)
    .bind(format)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Owner-scoped delete; returns rows affected (0 covers both "absent" and
/// "not owned by caller").
pub async fn delete_item(
    tx: &mut Transaction<'_, Postgres>,
    item_id: Uuid,
    user_id: Uuid,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM portfolio_items WHERE item_id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_item_children(
    tx: &mut Transaction<'_, Postgres>,
    item_id: Uuid,
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM images WHERE item_id = $1")
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM item_tags WHERE item_id = $1")
        .bind(item_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = false;
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_dash = false;
        } else if !last_dash && !slug.is_empty() {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
