use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_recipe_engine::audience_cache::build_audience_cache;
use lead_recipe_engine::config::Config;
use lead_recipe_engine::handlers::{self, AppState};
use lead_recipe_engine::provider_client::AudienceProviderClient;

/// Maximum number of distinct provider pulls kept in memory.
const AUDIENCE_CACHE_CAPACITY: u64 = 1_000;

/// Main entry point for the application.
///
/// Initializes logging, configuration, the provider client and pull cache,
/// then serves the HTTP routes behind the rate limiter.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_recipe_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let provider_client = AudienceProviderClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize audience client: {}", e))?;
    tracing::info!(
        "✓ Audience provider client initialized ({})",
        config.audience_provider_name
    );

    // Provider pulls are costly; identical targeting within the TTL reuses the batch
    let audience_cache = build_audience_cache(
        Duration::from_secs(config.audience_cache_ttl_secs),
        AUDIENCE_CACHE_CAPACITY,
    );
    tracing::info!(
        "Audience cache initialized ({}s TTL, {} capacity)",
        config.audience_cache_ttl_secs,
        AUDIENCE_CACHE_CAPACITY
    );

    let port = config.port;
    let app_state = Arc::new(AppState {
        config,
        provider_client,
        audience_cache,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = handlers::lead_routes().layer(
        ServiceBuilder::new()
            // Request size limit: 5MB max payload (score requests carry contacts)
            .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
