// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /classify HTTP handler

use axum::extract::State;
use axum::Json;
use tracing::debug;

use super::request::PetitionJson;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::classification::ClassificationResult;

/// POST /classify handler
///
/// # Request Body
/// ```json
/// {
///   "title": "River pollution rising",
///   "description": "Factories dumping waste into the river.",
///   "priority": "high",   // optional, default "medium"
///   "status": "new"       // optional, default "new"
/// }
/// ```
///
/// # Response Body
/// ```json
/// {
///   "petition": { "title": "...", "description": "...", "priority": "high", "status": "new" },
///   "predicted_category": "Environment",
///   "confidence": 0.91,
///   "all_scores": { "Environment": 0.91, "Water Resources": 0.04, ... }
/// }
/// ```
pub async fn classify_handler(
    State(state): State<AppState>,
    PetitionJson(petition): PetitionJson,
) -> Result<Json<ClassificationResult>, ApiError> {
    debug!(title = %petition.title, "Classify request received");
    let result = state.service.classify(petition).await?;
    Ok(Json(result))
}
