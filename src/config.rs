// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Every option can be given as a flag or an environment variable. `main`
//! loads `.env` before parsing, so values there act as environment.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::classification::onnx_model::{DEFAULT_HYPOTHESIS_TEMPLATE, DEFAULT_MAX_LENGTH};
use crate::classification::{ModelSource, ZeroShotModelConfig, ZeroShotOptions, MODEL_ID};

/// ONNX graph path inside the hub repository.
pub const DEFAULT_HUB_ONNX_FILE: &str = "onnx/model.onnx";

/// ONNX graph name inside a local model directory.
pub const DEFAULT_LOCAL_ONNX_FILE: &str = "model.onnx";

#[derive(Parser, Debug, Clone)]
#[command(name = "petition-classifier")]
#[command(about = "Zero-shot petition classification service", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Local directory with the ONNX graph, tokenizer.json and config.json.
    /// When unset the model is fetched from the Hugging Face Hub.
    #[arg(long, env = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    #[arg(long, env = "MODEL_HUB_REPO", default_value = "Xenova/bart-large-mnli")]
    pub hub_repo: String,

    #[arg(long, env = "MODEL_HUB_REVISION", default_value = "main")]
    pub hub_revision: String,

    /// ONNX graph path relative to the model root
    #[arg(long, env = "MODEL_ONNX_FILE")]
    pub onnx_file: Option<String>,

    /// Hypothesis built for each category; `{}` is replaced by the label
    #[arg(long, env = "HYPOTHESIS_TEMPLATE", default_value = DEFAULT_HYPOTHESIS_TEMPLATE)]
    pub hypothesis_template: String,

    /// Score each category independently instead of normalizing across them
    #[arg(long, env = "MULTI_LABEL")]
    pub multi_label: bool,

    #[arg(long, env = "MAX_SEQUENCE_LENGTH", default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_length: usize,

    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Allow cross-origin requests from any origin
    #[arg(long, env = "ENABLE_CORS")]
    pub cors: bool,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.hypothesis_template.contains("{}") {
            bail!(
                "Hypothesis template must contain '{{}}': {:?}",
                self.hypothesis_template
            );
        }
        if self.max_length == 0 {
            bail!("Max sequence length must be greater than 0");
        }
        if self.intra_threads == 0 {
            bail!("Intra-op thread count must be greater than 0");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_config(&self) -> ZeroShotModelConfig {
        let (source, default_onnx_file) = match &self.model_dir {
            Some(dir) => (ModelSource::Local(dir.clone()), DEFAULT_LOCAL_ONNX_FILE),
            None => (
                ModelSource::Hub {
                    repo: self.hub_repo.clone(),
                    revision: self.hub_revision.clone(),
                },
                DEFAULT_HUB_ONNX_FILE,
            ),
        };

        ZeroShotModelConfig {
            name: MODEL_ID.to_string(),
            source,
            onnx_file: self
                .onnx_file
                .clone()
                .unwrap_or_else(|| default_onnx_file.to_string()),
            options: ZeroShotOptions {
                hypothesis_template: self.hypothesis_template.clone(),
                multi_label: self.multi_label,
                max_length: self.max_length,
                intra_threads: self.intra_threads,
            },
        }
    }
}
