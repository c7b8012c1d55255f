use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::backend::{PathDataSource, SupabaseClient};
use crate::cache::PersistentCache;
use crate::config::WalkConfig;
use crate::location_resolver::{LocationResolver, NominatimGeocoder};
use crate::recommend::RecommendationService;
use crate::speech::{HostedSpeechEngine, Narrator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Wire every service from configuration.
///
/// A cache that cannot be opened and a missing speech key only disable
/// those features.
pub fn build_state(config: &WalkConfig) -> Result<AppState> {
    let source: Arc<dyn PathDataSource> =
        Arc::new(SupabaseClient::new(&config.backend).context("Failed to create backend client")?);

    let cache = match PersistentCache::open(&config.cache.location) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!("Cache at {} unavailable, running without it: {}", config.cache.location, e);
            None
        }
    };

    let geocoder = NominatimGeocoder::new(&config.geocoding, cache, config.cache.ttl())
        .context("Failed to create geocoding client")?;
    let resolver = LocationResolver::new(Arc::new(geocoder), config.defaults.fallback_location());

    let narrator = match HostedSpeechEngine::new(&config.speech) {
        Ok(engine) => Some(Arc::new(Mutex::new(Narrator::new(Arc::new(engine))))),
        Err(e) => {
            info!("Narration disabled: {}", e);
            None
        }
    };

    let service = RecommendationService::new(
        source.clone(),
        config.defaults.clone(),
        Some(config.backend.fetch_limit),
    );

    Ok(AppState {
        service: Arc::new(service),
        resolver: Arc::new(resolver),
        source,
        narrator,
    })
}

/// Full application: `/api` routes with CORS and a request timeout
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors)
        .with_state(state)
}

pub async fn run(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
