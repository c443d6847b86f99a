//! Tabletop Terminal engine - Main entry point.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tabletop_engine::api;
use tabletop_engine::infrastructure::catalog::CatalogLoader;
use tabletop_engine::infrastructure::clock::{SystemClock, SystemRandom};
use tabletop_engine::infrastructure::config::{AppConfig, StoreBackend};
use tabletop_engine::infrastructure::persistence::{InMemoryRecordStore, SqliteRecordStore};
use tabletop_engine::infrastructure::ports::{ClockPort, RecordStore};
use tabletop_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabletop_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tabletop Terminal engine");

    let config = AppConfig::from_env()?;
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let loader = match &config.catalog_dir {
        Some(dir) => CatalogLoader::from_dir(dir.clone()),
        None => CatalogLoader::bundled(),
    };
    let catalog = loader.load().await?;

    let records: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Sqlite => {
            tracing::info!(path = %config.database_path, "Opening SQLite record store");
            Arc::new(SqliteRecordStore::new(&config.database_path, clock.clone()).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; progress is lost on restart");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let app = Arc::new(App::new(
        records,
        catalog,
        clock,
        Arc::new(SystemRandom::new()),
    ));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins.map(str::trim).filter(|s| !s.is_empty())?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
