use anyhow::Context;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use wishlist::{
    app::{router, AppState},
    config::Config,
    infrastructure::logger::Logger,
    scraper::Scraper,
    storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    let config = Config::load().context("failed to load configuration")?;
    let _guard = Logger::init(&config.logging)?;

    info!(
        backend = ?config.storage.backend,
        port = config.http.port,
        browser = config.scraper.browser.enabled,
        "starting wishlist server"
    );

    let storage = storage::connect(&config.storage).await?;
    let scraper = Scraper::from_config(&config.scraper).context("failed to build scraper")?;

    let state = AppState::new(storage, Arc::new(scraper));
    let app = router(state, Duration::from_secs(config.http.timeout_seconds));

    let addr = format!("{}:{}", config.http.bind_address, config.http.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
