// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::State;
use axum::Json;
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::classification::HealthReport;

/// GET /health
///
/// Reports the model id and the category set, or a 500 with
/// `{"detail": "Model is not loaded."}` when the model never loaded.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthReport>, ApiError> {
    debug!("Health check requested");
    let report = state.service.health_check()?;
    Ok(Json(report))
}
