// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod classify;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use classify::{classify_handler, PetitionJson};
pub use errors::{ApiError, ErrorDetail, ErrorResponse, ValidationIssue};
pub use handlers::health_handler;
pub use http_server::{create_router, start_server, AppState};
