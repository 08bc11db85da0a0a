// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use petition_classifier::{
    api::{start_server, AppState},
    classification::{ClassificationService, ModelLoader},
    config::ServiceConfig,
    version,
};
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::parse();
    config.validate()?;

    println!("🚀 Starting petition classifier...");
    info!("BUILD VERSION: {}", version::get_version_string());
    info!(info = %version::get_version_info(), "Version info");

    // A failed load is logged and leaves the service running without a model
    let model_config = config.model_config();
    info!(
        source = ?model_config.source,
        onnx_file = %model_config.onnx_file,
        multi_label = model_config.options.multi_label,
        "Model configuration"
    );
    let state = ModelLoader::new(model_config).load_state().await;
    if state.is_available() {
        println!("✅ Zero-shot model loaded");
    } else {
        warn!("Model unavailable; /health and /classify will report errors");
        println!("⚠️  Zero-shot model not loaded, serving in degraded mode");
    }

    let service = ClassificationService::new(state);
    println!("🌐 API server: http://{}", config.bind_address());

    start_server(&config, AppState::new(service)).await?;

    println!("👋 Petition classifier stopped");
    Ok(())
}
