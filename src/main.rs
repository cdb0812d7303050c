use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

use config::AppConfig;
use infrastructure::AppContainer;
use presentation::HttpServer;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let port = config.port;

    tracing::info!("Starting dbinsight on port {}", port);

    let container = AppContainer::new(config)
        .await
        .expect("Failed to initialize application container");

    let server = HttpServer::new(
        container.query_handler.clone(),
        container.schema_handler.clone(),
        container.chat_handler.clone(),
        container.tool_handler.clone(),
        Some(port),
    );

    server.run().await.expect("HTTP server failed");
}
