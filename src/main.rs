use anyhow::{Context, Result};
use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use used_car_finder::{AppState, config::Settings, inventory_api, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "used_car_finder=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing used car finder server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Searches report the missing key themselves; the pages still load
    if settings.api_key.as_deref().is_none_or(|key| key.trim().is_empty()) {
        tracing::warn!(
            "No inventory API key configured (APP_API_KEY); searches will fail until it is set."
        );
    }
    tracing::info!(
        base_url = %settings.base_url,
        page_size = settings.page_size,
        "Inventory search settings"
    );

    let http_client = inventory_api::build_http_client(&settings)?;
    tracing::info!("Shared HTTP client created.");

    let app_state = AppState {
        settings: Arc::new(settings),
        http_client,
    };

    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address format in configuration ('{}')",
                app_state.settings.server_address
            )
        })?;

    let app: Router =
        routes::create_router(app_state).nest_service("/static", ServeDir::new("static"));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
