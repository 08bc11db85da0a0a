// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::classification::ServiceError;

/// One entry of a 422 `detail` list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    pub fn body(field: Option<&str>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        let mut loc = vec!["body".to_string()];
        if let Some(field) = field {
            loc.push(field.to_string());
        }
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    ValidationError(Vec<ValidationIssue>),
    ServiceUnavailable(String),
    ClassificationFailed(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            ApiError::ValidationError(issues) => ErrorDetail::Validation(issues.clone()),
            ApiError::ServiceUnavailable(msg)
            | ApiError::ClassificationFailed(msg) => ErrorDetail::Message(msg.clone()),
        };

        ErrorResponse { detail }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) => 422,
            // The unavailable model is reported as a server error, not 503
            ApiError::ServiceUnavailable(_)
            | ApiError::ClassificationFailed(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(issues) => {
                write!(f, "Validation error: {} issue(s)", issues.len())
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::ClassificationFailed(msg) => write!(f, "Classification failed: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(detail) => ApiError::ServiceUnavailable(detail.to_string()),
            ServiceError::ClassificationFailed(e) => ApiError::ClassificationFailed(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("{}", self);
        }

        (status, Json(self.to_response())).into_response()
    }
}
