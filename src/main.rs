use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use menaps_site::cms::CmsClient;
use menaps_site::config::Config;
use menaps_site::mailer;
use menaps_site::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("menaps_site=info".parse()?),
        )
        .init();

    info!("Starting MENAPS site");

    let config = Config::from_env()?;
    let content = Arc::new(CmsClient::from_config(&config)?);
    let mailer = mailer::from_config(&config)?;

    info!(
        "Content from {}, locales [{}] (default {})",
        config.cms_url,
        config.supported_locales.join(", "),
        config.default_locale
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, content, mailer)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
