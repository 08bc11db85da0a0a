// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /classify

use super::support::{
    available_router, get, json_post, router_with, send, send_raw, unavailable_router,
    CountingClassifier, FailingClassifier,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use petition_classifier::classification::{ClassificationResult, ClassifierState, CATEGORIES};
use serde_json::{json, Value};

const RIVER_PETITION: &str = r#"{
    "title": "River pollution rising",
    "description": "Factories dumping waste into the river."
}"#;

fn max_score(scores: &Value) -> f64 {
    scores
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_f64().unwrap())
        .fold(f64::MIN, f64::max)
}

// ========== SUCCESS CASES ==========

#[tokio::test]
async fn test_river_pollution_is_environment() {
    let (status, body) = send(available_router(), json_post("/classify", RIVER_PETITION)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_category"], "Environment");
    assert_eq!(
        body["petition"],
        json!({
            "title": "River pollution rising",
            "description": "Factories dumping waste into the river.",
            "priority": "medium",
            "status": "new"
        })
    );
}

#[tokio::test]
async fn test_scores_cover_every_category() {
    let (_, body) = send(available_router(), json_post("/classify", RIVER_PETITION)).await;
    let scores = body["all_scores"].as_object().unwrap();

    assert_eq!(scores.len(), 15);
    for category in CATEGORIES {
        assert!(scores.contains_key(category), "missing {}", category);
    }

    let predicted = body["predicted_category"].as_str().unwrap();
    assert!(CATEGORIES.contains(&predicted));
}

#[tokio::test]
async fn test_confidence_is_top_score() {
    let (_, body) = send(available_router(), json_post("/classify", RIVER_PETITION)).await;

    let predicted = body["predicted_category"].as_str().unwrap();
    let confidence = body["confidence"].as_f64().unwrap();
    assert_eq!(body["all_scores"][predicted].as_f64().unwrap(), confidence);
    assert_eq!(max_score(&body["all_scores"]), confidence);
}

#[tokio::test]
async fn test_all_scores_are_ranked_on_the_wire() {
    let (status, bytes) = send_raw(available_router(), json_post("/classify", RIVER_PETITION)).await;
    assert_eq!(status, StatusCode::OK);

    let result: ClassificationResult = serde_json::from_slice(&bytes).unwrap();
    let values: Vec<f64> = result.all_scores.iter().map(|(_, score)| score).collect();
    assert_eq!(values.len(), 15);
    assert!(values.windows(2).all(|w| w[0] >= w[1]), "not ranked: {:?}", values);

    let first_key = result.all_scores.keys().next().unwrap();
    assert_eq!(first_key, "Environment");
    assert_eq!(first_key, result.predicted_category);
}

#[tokio::test]
async fn test_optional_fields_are_echoed() {
    let request = json_post(
        "/classify",
        r#"{"title": "Clinic closures", "description": "Rural clinic shut.", "priority": "high", "status": null}"#,
    );
    let (status, body) = send(available_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_category"], "Health");
    assert_eq!(body["petition"]["priority"], "high");
    assert!(body["petition"]["status"].is_null());
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let first = send(available_router(), json_post("/classify", RIVER_PETITION)).await;
    let second = send(available_router(), json_post("/classify", RIVER_PETITION)).await;
    assert_eq!(first, second);
}

// ========== VALIDATION ERRORS ==========

#[tokio::test]
async fn test_missing_title_is_422_and_skips_classifier() {
    let classifier = CountingClassifier::default();
    let app = router_with(ClassifierState::available(classifier.clone()));

    let (status, body) = send(app, json_post("/classify", r#"{"description": "d"}"#)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "title"]));
    assert_eq!(body["detail"][0]["type"], "missing");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_wrong_field_type_is_422() {
    let request = json_post("/classify", r#"{"title": "t", "description": 42}"#);
    let (status, body) = send(available_router(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_array());
    assert_eq!(body["detail"][0]["loc"][0], "body");
}

#[tokio::test]
async fn test_malformed_json_is_422() {
    let (status, body) = send(available_router(), json_post("/classify", "{\"title\": ")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");
}

#[tokio::test]
async fn test_missing_content_type_is_422() {
    let request = Request::builder()
        .method("POST")
        .uri("/classify")
        .body(Body::from(RIVER_PETITION))
        .unwrap();
    let (status, body) = send(available_router(), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "missing_content_type");
}

#[tokio::test]
async fn test_get_classify_not_allowed() {
    let (status, _) = send(available_router(), get("/classify")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ========== SERVER ERRORS ==========

#[tokio::test]
async fn test_classify_without_model() {
    let (status, body) = send(unavailable_router(), json_post("/classify", RIVER_PETITION)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Model is not available."}));
}

#[tokio::test]
async fn test_classifier_failure_is_500_with_message() {
    let app = router_with(ClassifierState::available(FailingClassifier));

    for _ in 0..2 {
        let (status, body) = send(app.clone(), json_post("/classify", RIVER_PETITION)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"detail": "inference failed: output tensor has wrong shape"})
        );
    }
}
