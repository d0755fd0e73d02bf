use anyhow::Context;
use db::{DBService, seed::SeedData};
use server::{AppState, app, config::ServerConfig};
use tracing::info;
use utils::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info,server=debug");

    let config = ServerConfig::from_env()?;
    let seed = match &config.seed_data_path {
        Some(path) => SeedData::from_path(path)
            .with_context(|| format!("failed to load seed data from {}", path.display()))?,
        None => SeedData::builtin()?,
    };
    let db = DBService::new_seeded(&seed).await?;

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!("Mock API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(AppState::new(db)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
