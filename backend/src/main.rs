use std::sync::Arc;

use tracing::{info, warn};

mod app;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod models;
mod openapi;
mod services;

use crate::config::Settings;
use crate::health::{BasicHealthCheck, HealthChecks};
use crate::services::{DemoFooService, FooService};

/// Shared application state. Every field sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub foo_service: Arc<dyn FooService>,
    pub health: Arc<HealthChecks>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,starter_api=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let settings = Arc::new(Settings::load()?);

    // Dependency graph, wired by hand
    let state = AppState {
        settings: settings.clone(),
        foo_service: Arc::new(DemoFooService::new(settings.connection_strings.clone())),
        health: Arc::new(
            HealthChecks::new(settings.health.timeout())
                .register("basic", &["ready", "live"], BasicHealthCheck),
        ),
    };

    let router = app::build_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Listening on http://{}", addr);
    info!("Swagger UI: http://{}{}", addr, openapi::UI_PATH);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
