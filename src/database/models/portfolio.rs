use sqlx::FromRow;
use uuid::Uuid;

/// One listing row as it comes back from the grouped query: child rows
/// (tag names, image urls) are comma-concatenated scalars, re-shaped by the
/// listing workflow.
#[derive(Debug, Clone, FromRow)]
pub struct PortfolioItemRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub images: Option<String>,
}
