// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request extraction for POST /classify
//!
//! Wraps axum's `Json` extractor so every body rejection turns into a 422
//! with a `detail` list instead of axum's plain-text errors.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use serde::Deserialize;

use crate::api::errors::{ApiError, ValidationIssue};
use crate::classification::Petition;

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// A petition parsed from the request body.
#[derive(Debug, Deserialize, FromRequest)]
#[serde(transparent)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct PetitionJson(pub Petition);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let issue = match &rejection {
            JsonRejection::JsonDataError(_) => data_error_issue(&rejection.body_text()),
            JsonRejection::JsonSyntaxError(_) => {
                ValidationIssue::body(None, "JSON decode error", "json_invalid")
            }
            JsonRejection::MissingJsonContentType(_) => ValidationIssue::body(
                None,
                "Expected request with `Content-Type: application/json`",
                "missing_content_type",
            ),
            _ => ValidationIssue::body(None, rejection.body_text(), "body_error"),
        };
        ApiError::ValidationError(vec![issue])
    }
}

/// Turns a deserialization message into a located issue.
///
/// Handles the two shapes axum produces: `missing field `x` at line ..`
/// and `path: reason at line ..`.
pub fn data_error_issue(text: &str) -> ValidationIssue {
    let reason = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
    let reason = match reason.rfind(" at line ") {
        Some(pos) => &reason[..pos],
        None => reason,
    };

    if let Some(field) = reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        return ValidationIssue::body(Some(field), "Field required", "missing");
    }

    match reason.split_once(": ") {
        Some((path, msg)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            ValidationIssue::body(Some(path), msg, "type_error")
        }
        _ => ValidationIssue::body(None, reason, "type_error"),
    }
}
