use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod media;
mod middleware;
mod uploads;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();
    tracing::info!("Starting InkCase API in {:?} mode", config.environment);

    let pool = database::pool()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
    database::run_migrations(&pool)
        .await
        .unwrap_or_else(|e| panic!("failed to run migrations: {}", e));

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("INKCASE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(16000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("InkCase API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (loggedIn reads the token itself)
        .merge(auth_routes())
        // Public dev catalog
        .merge(catalog_routes())
        // Owner-scoped routes behind the token gate
        .merge(portfolio_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(100 * 1024 * 1024))
}

fn auth_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/signup", post(auth::signup_post))
        .route("/login", post(auth::login_post))
        .route("/loggedIn", post(auth::logged_in_post))
}

fn catalog_routes() -> Router {
    use handlers::public::dev_portfolio as catalog;

    Router::new()
        .route("/dev-portfolio", get(catalog::catalog_get))
        .route("/dev-portfolio/:id", get(catalog::catalog_show))
}

fn portfolio_routes() -> Router {
    use handlers::protected::{dev_portfolio, portfolio};

    Router::new()
        .route("/getMyPortfolioItems", get(portfolio::list_get))
        .route("/countMyPortfolioItems", get(portfolio::count_get))
        .route("/getDevPortfolioItems", get(dev_portfolio::list_get))
        .route("/uploadFiles", post(portfolio::upload_post))
        .route("/uploadDevFiles", post(dev_portfolio::upload_post))
        .route("/deleteItem", post(portfolio::delete_post))
        .route_layer(axum::middleware::from_fn(middleware::token_gate))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to InkCase Backend API" }))
}

async fn health() -> Json<Value> {
    match database::health_check().await {
        Ok(()) => Json(json!({ "status": "ok", "database": "up" })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Json(json!({ "status": "degraded", "database": "down" }))
        }
    }
}
