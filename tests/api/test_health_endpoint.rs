// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health

use super::support::{available_router, get, send, unavailable_router};
use axum::http::StatusCode;
use petition_classifier::classification::CATEGORIES;
use serde_json::json;

#[tokio::test]
async fn test_health_reports_model_and_categories() {
    let (status, body) = send(available_router(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "facebook/bart-large-mnli");
    assert_eq!(body["categories"], json!(CATEGORIES));
}

#[tokio::test]
async fn test_health_category_order() {
    let (_, body) = send(available_router(), get("/health")).await;
    let categories = body["categories"].as_array().unwrap();

    assert_eq!(categories.len(), 15);
    assert_eq!(categories[0], "Environment");
    assert_eq!(categories[14], "Consumer Affairs");
}

#[tokio::test]
async fn test_health_without_model() {
    let (status, body) = send(unavailable_router(), get("/health")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Model is not loaded."}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = send(available_router(), get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
