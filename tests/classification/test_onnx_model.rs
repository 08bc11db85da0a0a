// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX zero-shot model tests
//!
//! The real-model tests need an exported bart-large-mnli directory
//! (`model.onnx`, `tokenizer.json`, `config.json`) in `MODEL_DIR`:
//!
//! ```text
//! MODEL_DIR=/models/bart-large-mnli cargo test --test classification_tests -- --ignored
//! ```

use petition_classifier::classification::{
    category_labels, ClassificationService, ModelLoader, ModelSource, Petition,
    ZeroShotClassifier, ZeroShotModelConfig, ZeroShotOptions, MODEL_ID,
};
use std::path::PathBuf;

fn local_config(dir: PathBuf, options: ZeroShotOptions) -> ZeroShotModelConfig {
    ZeroShotModelConfig {
        name: MODEL_ID.to_string(),
        source: ModelSource::Local(dir),
        onnx_file: "model.onnx".to_string(),
        options,
    }
}

fn model_dir() -> PathBuf {
    PathBuf::from(std::env::var("MODEL_DIR").expect("MODEL_DIR must point at the exported model"))
}

#[tokio::test]
async fn test_missing_model_dir_degrades_service() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ModelLoader::new(local_config(
        dir.path().join("bart-large-mnli"),
        ZeroShotOptions::default(),
    ));

    let service = ClassificationService::new(loader.load_state().await);
    assert!(!service.is_available());
    assert!(service.health_check().is_err());
}

#[tokio::test]
async fn test_corrupt_model_file_degrades_service() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.onnx"), b"not an onnx graph").unwrap();
    std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        br#"{"id2label": {"0": "contradiction", "1": "neutral", "2": "entailment"}}"#,
    )
    .unwrap();

    let loader = ModelLoader::new(local_config(dir.path().to_path_buf(), ZeroShotOptions::default()));
    assert!(loader.load().await.is_err());
    assert!(!loader.load_state().await.is_available());
}

#[tokio::test]
#[ignore] // Requires MODEL_DIR with an exported bart-large-mnli
async fn test_real_model_river_pollution_is_environment() {
    let loader = ModelLoader::new(local_config(model_dir(), ZeroShotOptions::default()));
    let service = ClassificationService::new(loader.load_state().await);
    assert!(service.is_available());

    let result = service
        .classify(Petition::new(
            "River pollution rising",
            "Factories dumping waste into the river.",
        ))
        .await
        .unwrap();

    assert_eq!(result.predicted_category, "Environment");
    assert_eq!(result.all_scores.len(), 15);

    let total: f64 = result.all_scores.iter().map(|(_, score)| score).sum();
    assert!((total - 1.0).abs() < 1e-3, "single-label scores sum to {}", total);
}

#[tokio::test]
#[ignore] // Requires MODEL_DIR with an exported bart-large-mnli
async fn test_real_model_multi_label_scores_are_independent() {
    let options = ZeroShotOptions {
        multi_label: true,
        ..ZeroShotOptions::default()
    };
    let model = ModelLoader::new(local_config(model_dir(), options))
        .load()
        .await
        .unwrap();

    let scores = model
        .classify(
            "Rents doubled while the bus route to the hospital was cut.",
            &category_labels(),
        )
        .unwrap();

    assert_eq!(scores.len(), 15);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
#[ignore] // Requires MODEL_DIR with an exported bart-large-mnli
async fn test_real_model_rejects_empty_text() {
    let model = ModelLoader::new(local_config(model_dir(), ZeroShotOptions::default()))
        .load()
        .await
        .unwrap();

    assert!(model.classify("   ", &category_labels()).is_err());
}
