//! league-standings server entry point.
//!
//! Starts the Axum HTTP server over PostgreSQL, or over the in-memory
//! store when persistence is disabled.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use league_standings::api;
use league_standings::app_state::AppState;
use league_standings::config::{self, ServiceConfig};
use league_standings::persistence::{LeagueStore, MemoryLeagueStore, PgLeagueStore};
use league_standings::service::LeagueService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config::log_format_is_json() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = ServiceConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        addr = %config.listen_addr,
        persistence = config.persistence_enabled,
        rank_scope = %config.history_rank_scope,
        recompute = %config.recompute_policy,
        "starting league-standings"
    );

    if config.persistence_enabled {
        let store = PgLeagueStore::connect(&config).await?;
        if config.run_migrations {
            store.migrate().await?;
            tracing::info!("database migrations applied");
        }
        serve(&config, store).await
    } else {
        tracing::warn!("persistence disabled, using in-memory store");
        serve(&config, MemoryLeagueStore::with_default_roster()).await
    }
}

async fn serve<S: LeagueStore>(config: &ServiceConfig, store: S) -> anyhow::Result<()> {
    // Build service layer
    let league_service = LeagueService::new(
        Arc::new(store),
        config.history_rank_scope,
        config.recompute_policy,
    );
    let app_state = AppState::new(league_service);

    // Build router
    let app = Router::new().merge(api::build_router());
    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
