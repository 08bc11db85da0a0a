// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Error types for zero-shot classification

use thiserror::Error;

/// Failure of a single classifier call.
///
/// Input errors (`EmptyInput`, `NoLabels`) are distinguished from errors
/// raised inside the model or by a classifier that broke its output contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("text to classify is empty")]
    EmptyInput,

    #[error("no candidate labels supplied")]
    NoLabels,

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("classifier returned no scores")]
    EmptyOutput,

    #[error("classifier returned no score for label '{0}'")]
    MissingLabel(String),

    #[error("classifier returned unexpected label '{0}'")]
    UnexpectedLabel(String),

    #[error("classifier returned invalid score {score} for label '{label}'")]
    InvalidScore { label: String, score: f32 },
}

impl ClassifierError {
    /// True when the caller supplied bad input, false for model-side failures.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ClassifierError::EmptyInput | ClassifierError::NoLabels)
    }
}

/// Failure of a [`ClassificationService`](super::ClassificationService) operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The classifier failed to load at startup. Carries the client-facing detail.
    #[error("{0}")]
    Unavailable(&'static str),

    #[error(transparent)]
    ClassificationFailed(#[from] ClassifierError),
}
