use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use service::subscription::repo::seaorm::SeaOrmSubscriptionRepository;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Resolves once Ctrl+C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl_c; shutdown signal disabled");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: connect storage, build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&cfg.database).await?;

    if cfg.database.auto_migrate {
        Migrator::up(&db, None).await?;
        info!(event = "migrations_applied", "database schema up to date");
    }

    let repo = Arc::new(SeaOrmSubscriptionRepository::new(db));
    let state = AppState::new(repo);

    let app: Router = routes::build_router(state, build_cors());

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "subscriptions server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
