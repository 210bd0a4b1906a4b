#![deny(warnings)]

use anyhow::Result;
use server::{build_router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env();
    info!(?config, "starting server");

    persistence::prepare_sqlite_path(&config.database_url)?;
    let pool = persistence::init_db(&config.database_url).await?;
    if persistence::seed_settings(&pool, &config.seed_settings()?).await? {
        info!("seeded default settings");
    }

    let addr = config.bind_addr();
    let app = build_router(AppState::new(pool, config));
    let listener = TcpListener::bind(&addr).await?;
    info!("server listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;
    Ok(())
}
