// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Petition categories
//!
//! The fixed, ordered label set every petition is scored against. The order
//! is the order reported by `GET /health` and the order labels are handed to
//! the classifier.

/// Identifier of the NLI model the service reports.
pub const MODEL_ID: &str = "facebook/bart-large-mnli";

/// The 15 petition categories, in canonical order.
pub const CATEGORIES: [&str; 15] = [
    "Environment",
    "Justice",
    "Health",
    "Education",
    "Housing",
    "Transportation",
    "Labor",
    "Energy",
    "Agriculture",
    "Finance",
    "Public Safety",
    "Social Welfare",
    "Water Resources",
    "Communications",
    "Consumer Affairs",
];

/// Returns the categories as owned labels, ready to pass to a classifier.
pub fn category_labels() -> Vec<String> {
    CATEGORIES.iter().map(|c| c.to_string()).collect()
}
