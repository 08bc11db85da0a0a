// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Classification service
//!
//! Stateless apart from the classifier handle injected at startup. Exposes
//! the two operations behind the HTTP surface: `health_check` and `classify`.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::categories::{category_labels, MODEL_ID};
use super::classifier::{check_scores, rank_scores, ClassifierState, LabelScore};
use super::error::{ClassifierError, ServiceError};
use super::petition::{ClassificationResult, Petition};

/// Detail reported by `health_check` when the model failed to load.
pub const MODEL_NOT_LOADED: &str = "Model is not loaded.";

/// Detail reported by `classify` when the model failed to load.
pub const MODEL_NOT_AVAILABLE: &str = "Model is not available.";

/// Response body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub model: String,
    pub categories: Vec<String>,
}

pub struct ClassificationService {
    state: ClassifierState,
    model_id: String,
    categories: Vec<String>,
}

impl ClassificationService {
    /// Service over the fixed petition categories and the bart-large-mnli id.
    pub fn new(state: ClassifierState) -> Self {
        Self::with_model_id(state, MODEL_ID)
    }

    pub fn with_model_id(state: ClassifierState, model_id: impl Into<String>) -> Self {
        Self {
            state,
            model_id: model_id.into(),
            categories: category_labels(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    pub fn health_check(&self) -> Result<HealthReport, ServiceError> {
        if !self.state.is_available() {
            return Err(ServiceError::Unavailable(MODEL_NOT_LOADED));
        }

        Ok(HealthReport {
            status: "ok".to_string(),
            model: self.model_id.clone(),
            categories: self.categories.clone(),
        })
    }

    /// Scores the petition against every category and picks the best one.
    ///
    /// Inference runs on the blocking pool. Any classifier failure comes
    /// back as [`ServiceError::ClassificationFailed`] and leaves the service
    /// usable for later requests.
    pub async fn classify(&self, petition: Petition) -> Result<ClassificationResult, ServiceError> {
        let classifier = self
            .state
            .classifier()
            .ok_or(ServiceError::Unavailable(MODEL_NOT_AVAILABLE))?;

        let text = petition.text_to_classify();
        let labels = self.categories.clone();
        debug!(chars = text.len(), labels = labels.len(), "Classifying petition");

        let start = Instant::now();
        let scores = tokio::task::spawn_blocking(move || classifier.classify(&text, &labels))
            .await
            .map_err(|e| ClassifierError::Inference(format!("classification task failed: {}", e)))?
            .map_err(|e| {
                warn!(input_error = e.is_input_error(), "Classification failed: {}", e);
                e
            })?;

        let result = assemble_result(petition, scores, &self.categories)?;

        info!(
            category = %result.predicted_category,
            confidence = result.confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Petition classified"
        );
        Ok(result)
    }
}

/// Builds the result from raw classifier scores.
///
/// Checks the scores cover exactly `categories`, ranks them, and takes the
/// top entry as the prediction.
pub fn assemble_result(
    petition: Petition,
    mut scores: Vec<LabelScore>,
    categories: &[String],
) -> Result<ClassificationResult, ClassifierError> {
    check_scores(&scores, categories)?;
    rank_scores(&mut scores);

    let top = scores.first().ok_or(ClassifierError::EmptyOutput)?;
    let predicted_category = top.label.clone();
    let confidence = top.score as f64;

    let all_scores = scores
        .into_iter()
        .map(|entry| (entry.label, entry.score as f64))
        .collect();

    Ok(ClassificationResult {
        petition,
        predicted_category,
        confidence,
        all_scores,
    })
}
