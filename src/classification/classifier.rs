// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Zero-shot classifier abstraction
//!
//! The service never talks to ONNX Runtime directly. It holds a
//! [`ClassifierState`] built once at startup, which is either a loaded
//! [`ZeroShotClassifier`] or the reason loading failed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::error::ClassifierError;

/// Score assigned to one candidate label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Scores a text against candidate labels it was never trained on.
///
/// Implementations return one [`LabelScore`] per supplied label, ranked by
/// descending score. Calls are synchronous and CPU-bound; async callers run
/// them on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait ZeroShotClassifier: Send + Sync {
    fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// Whether the classifier loaded at startup.
///
/// Set once in `main` and never changed: a failed load is not retried.
#[derive(Clone)]
pub enum ClassifierState {
    Available(Arc<dyn ZeroShotClassifier>),
    Unavailable { reason: String },
}

impl ClassifierState {
    pub fn available(classifier: impl ZeroShotClassifier + 'static) -> Self {
        ClassifierState::Available(Arc::new(classifier))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ClassifierState::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ClassifierState::Available(_))
    }

    pub fn classifier(&self) -> Option<Arc<dyn ZeroShotClassifier>> {
        match self {
            ClassifierState::Available(classifier) => Some(Arc::clone(classifier)),
            ClassifierState::Unavailable { .. } => None,
        }
    }
}

impl fmt::Debug for ClassifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierState::Available(_) => f.write_str("Available"),
            ClassifierState::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Sorts scores in descending order. Stable, so ties keep their input order.
pub fn rank_scores(scores: &mut [LabelScore]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Checks classifier output against the labels it was asked to score.
///
/// Every requested label must be scored exactly once, nothing else may be
/// scored, and every score must be a finite probability.
pub fn check_scores(scores: &[LabelScore], requested: &[String]) -> Result<(), ClassifierError> {
    if scores.is_empty() {
        return Err(ClassifierError::EmptyOutput);
    }

    for (index, entry) in scores.iter().enumerate() {
        if !requested.iter().any(|label| label == &entry.label) {
            return Err(ClassifierError::UnexpectedLabel(entry.label.clone()));
        }
        // A repeated label would silently collapse in the score map.
        if scores[..index].iter().any(|prev| prev.label == entry.label) {
            return Err(ClassifierError::UnexpectedLabel(entry.label.clone()));
        }
        if !entry.score.is_finite() || !(0.0..=1.0).contains(&entry.score) {
            return Err(ClassifierError::InvalidScore {
                label: entry.label.clone(),
                score: entry.score,
            });
        }
    }

    if let Some(missing) = requested
        .iter()
        .find(|label| !scores.iter().any(|entry| &entry.label == *label))
    {
        return Err(ClassifierError::MissingLabel(missing.clone()));
    }

    Ok(())
}
