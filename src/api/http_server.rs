// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::classify::classify_handler;
use super::handlers::health_handler;
use crate::classification::ClassificationService;
use crate::config::ServiceConfig;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClassificationService>,
}

impl AppState {
    pub fn new(service: ClassificationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/classify", post(classify_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: &ServiceConfig, state: AppState) -> Result<()> {
    let mut app = create_router(state);
    if config.cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal, stopping server...");
    }
}
