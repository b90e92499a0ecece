pub mod dev_portfolio;
pub mod models;
pub mod portfolio;
pub mod users;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors from the database layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Process-wide connection pool, created lazily on first use.
pub async fn pool() -> Result<PgPool, DatabaseError> {
    let pool = POOL
        .get_or_try_init(|| async {
            let url = std::env::var("DATABASE_URL")
                .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
            // Validate early so a malformed URL fails with a clear error
            url::Url::parse(&url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

            let cfg = &config::config().database;
            let pool = PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .acquire_timeout(Duration::from_secs(cfg.connection_timeout))
                .connect(&url)
                .await?;

            info!("Created database pool");
            Ok::<_, DatabaseError>(pool)
        })
        .await?;

    Ok(pool.clone())
}

/// Pings the pool to ensure connectivity
pub async fn health_check() -> Result<(), DatabaseError> {
    let pool = pool().await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(())
}

/// Idempotent schema setup, run once at startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id UUID PRIMARY KEY,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            category_id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            tag_id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS portfolio_items (
            item_id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            category_id UUID REFERENCES categories(category_id),
            slug TEXT NOT NULL,
            user_id UUID NOT NULL REFERENCES users(user_id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS item_tags (
            item_id UUID NOT NULL,
            tag_id UUID NOT NULL,
            PRIMARY KEY (item_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS images (
            image_id UUID PRIMARY KEY,
            item_id UUID NOT NULL,
            url TEXT NOT NULL,
            alt_text TEXT,
            is_primary BOOLEAN NOT NULL DEFAULT FALSE,
            width INT,
            height INT,
            size BIGINT,
            format TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dev_portfolio_items (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            type TEXT NOT NULL,
            url TEXT,
            preview_url TEXT,
            status TEXT NOT NULL,
            year INT NOT NULL,
            tags JSONB NOT NULL DEFAULT '[]',
            technologies JSONB NOT NULL DEFAULT '[]',
            user_id UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dev_images (
            id UUID PRIMARY KEY,
            project_id UUID NOT NULL,
            url TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            alt_text TEXT,
            is_primary BOOLEAN NOT NULL DEFAULT FALSE,
            width INT,
            height INT,
            size BIGINT,
            format TEXT,
            public_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database migrations complete");
    Ok(())
}
