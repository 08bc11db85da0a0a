// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Petition classification endpoint (POST /classify)

pub mod handler;
pub mod request;

pub use handler::classify_handler;
pub use request::PetitionJson;
