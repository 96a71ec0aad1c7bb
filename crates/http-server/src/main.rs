use http_server::core::{AppConfig, AppState};
use http_server::app;
use std::env;
use std::net::SocketAddr;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from a .env file.
    dotenvy::dotenv().ok();
    // Use a JSON logger for production-ready structured logging.
    tracing_subscriber::fmt().json().init();

    let config = AppConfig::from_env();
    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    info!(
        domain = %config.domain,
        ttl_minutes = config.inbox_ttl_minutes,
        "starting temporary mail service"
    );

    let state = AppState::new(config);
    let router = app(state);

    // Bind to 0.0.0.0 to be reachable in a container.
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("HTTP Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
    }

    Ok(())
}
