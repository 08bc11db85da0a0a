// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Zero-shot petition classification
//!
//! Scores petitions against the fixed category set with an NLI model served
//! through ONNX Runtime.

pub mod categories;
pub mod classifier;
pub mod error;
pub mod model_loader;
pub mod onnx_model;
pub mod petition;
pub mod service;

pub use categories::{category_labels, CATEGORIES, MODEL_ID};
pub use classifier::{ClassifierState, LabelScore, ZeroShotClassifier};
pub use error::{ClassifierError, ServiceError};
pub use model_loader::{ModelFiles, ModelLoader, ModelSource, ZeroShotModelConfig};
pub use onnx_model::{OnnxZeroShotModel, ZeroShotOptions};
pub use petition::{ClassificationResult, Petition, ScoreMap};
pub use service::{assemble_result, ClassificationService, HealthReport};
