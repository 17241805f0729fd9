//! Emoji Catalog Backend
//!
//! REST backend for a searchable emoji catalog and its generated SEO landing pages,
//! persisted in SQLite.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod generator;
mod models;
mod seed;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use generator::PageGenerator;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub generator: PageGenerator,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        Self {
            generator: PageGenerator::new(repo.clone()),
            repo,
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Emoji Catalog Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (EMOJI_API_PSK). Page admin routes are open!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    if config.seed_on_startup {
        let report = seed::run(&repo).await?;
        tracing::info!(
            "Seeding done: {} emojis, {} page stubs inserted",
            report.emojis_inserted,
            report.pages_inserted
        );
    }

    let state = AppState::new(repo, config.clone());

    if config.backfill_on_startup {
        let summary = state
            .generator
            .backfill(
                generator::DEFAULT_BATCH_SIZE,
                generator::DEFAULT_BACKFILL_ROUNDS,
            )
            .await?;
        tracing::info!("Startup backfill generated {} pages", summary.generated);
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // Page admin routes
    let admin_routes = Router::new()
        .route("/pages/{key}", patch(api::update_page))
        .route("/pages/generate", post(api::generate_page))
        .route("/pages/generate-batch", post(api::generate_batch))
        .route("/pages/backfill", post(api::backfill_pages))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Public routes
    let public_routes = Router::new()
        // Emojis
        .route("/emojis", get(api::list_emojis))
        .route("/emojis/categories", get(api::list_categories))
        .route("/emojis/trending", get(api::trending_emojis))
        .route("/emojis/{key}", get(api::get_emoji))
        .route("/emojis/{key}/copy", post(api::copy_emoji))
        // Pages
        .route("/pages", get(api::list_pages))
        .route("/pages/{key}", get(api::get_page));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(admin_routes))
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
