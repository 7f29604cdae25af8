//! Docforge API server binary

use std::net::SocketAddr;

use anyhow::Result;
use docforge_api::{app, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docforge_api=info".parse()?)
                .add_directive("docforge_engine=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        timeout_ms = config.timeout_ms,
        body_limit = config.body_limit,
        "Initializing Docforge API..."
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = app(config);

    info!("Starting Docforge API on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
