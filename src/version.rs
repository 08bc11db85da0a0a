// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the petition classifier

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-13";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "zero-shot-classification",
    "onnx-runtime",
    "hf-hub-download",
    "multi-label-scoring",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Petition Classifier {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for diagnostics
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
