//! Taleforge API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use taleforge_api::routes;
use taleforge_api::state::AppState;
use taleforge_core::clock::{Clock, SystemClock};
use taleforge_core::store::StoryStore;
use taleforge_core::task::TaskExecutor;
use taleforge_genai::{OpenAiClient, TextGenerator};
use taleforge_jobs::{JobOrchestrator, TokioExecutor};
use taleforge_store::PgStoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Taleforge API server");

    // Read configuration from environment. The provider key is read lazily
    // by the client so a missing key fails jobs, not startup.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable must be set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;

    // Create database connection pool and apply the schema.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Wire the components.
    let store: Arc<dyn StoryStore> = Arc::new(PgStoryStore::new(pool));
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiClient::from_env());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let executor: Arc<dyn TaskExecutor> = Arc::new(TokioExecutor);
    let orchestrator = Arc::new(JobOrchestrator::new(
        Arc::clone(&store),
        generator,
        clock,
        executor,
    ));
    let app_state = AppState::new(store, orchestrator);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/stories", routes::stories::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
