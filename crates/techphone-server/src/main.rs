mod api;
mod cache;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(techphone_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = techphone_db::PoolConfig::from_app_config(&config);
    let pool = techphone_db::connect_pool(&config.database_url, pool_config).await?;
    techphone_db::run_migrations(&pool).await?;

    seed_catalog(&pool, &config).await?;

    let state = AppState::new(
        pool.clone(),
        Duration::from_secs(config.cache_ttl_secs),
        config.cache_capacity,
    );

    // Prime the dashboard snapshot so /api/admin/stats is warm from the start.
    scheduler::refresh_stats_snapshot(&pool, &state.stats).await;
    let _scheduler =
        scheduler::build_scheduler(pool, Arc::clone(&config), Arc::clone(&state.stats)).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        techphone_core::Environment::Development
    ))?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "techphone server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Upsert the YAML product catalog, if one is present at the configured path.
///
/// Missing file is not an error: deployments without a seed catalog simply
/// start with whatever the database already holds.
async fn seed_catalog(
    pool: &sqlx::PgPool,
    config: &techphone_core::AppConfig,
) -> anyhow::Result<()> {
    if !config.catalog_path.exists() {
        tracing::debug!(path = %config.catalog_path.display(), "no catalog file; skipping seed");
        return Ok(());
    }

    let catalog = techphone_core::load_catalog(&config.catalog_path)?;
    let upserted = techphone_db::seed_products(pool, &catalog.products).await?;
    tracing::info!(
        path = %config.catalog_path.display(),
        upserted,
        "seeded product catalog"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
