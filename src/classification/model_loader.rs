// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Zero-shot model loader
//!
//! Resolves the ONNX graph, tokenizer and model config either from a local
//! directory or from the Hugging Face Hub, then builds the
//! [`OnnxZeroShotModel`] on the blocking pool.

use anyhow::{Context, Result};
use hf_hub::api::tokio::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use tracing::{error, info};

use super::classifier::ClassifierState;
use super::onnx_model::{OnnxZeroShotModel, ZeroShotOptions};

pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const CONFIG_FILE: &str = "config.json";

/// Where the model files come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Directory holding `onnx_file`, `tokenizer.json` and `config.json`
    Local(PathBuf),
    /// Hugging Face Hub repository, downloaded into the local hub cache
    Hub { repo: String, revision: String },
}

/// Configuration for loading the zero-shot model
#[derive(Debug, Clone)]
pub struct ZeroShotModelConfig {
    /// Model identifier reported to clients (e.g., "facebook/bart-large-mnli")
    pub name: String,
    pub source: ModelSource,
    /// ONNX graph path relative to the source root
    pub onnx_file: String,
    pub options: ZeroShotOptions,
}

/// Local paths of the three files a model needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub config_path: PathBuf,
}

pub struct ModelLoader {
    config: ZeroShotModelConfig,
}

impl ModelLoader {
    pub fn new(config: ZeroShotModelConfig) -> Self {
        Self { config }
    }

    /// Locates (and for hub sources, downloads) the model files.
    pub async fn resolve_files(&self) -> Result<ModelFiles> {
        match &self.config.source {
            ModelSource::Local(dir) => {
                let files = ModelFiles {
                    model_path: dir.join(&self.config.onnx_file),
                    tokenizer_path: dir.join(TOKENIZER_FILE),
                    config_path: dir.join(CONFIG_FILE),
                };
                for path in [&files.model_path, &files.tokenizer_path, &files.config_path] {
                    if !path.exists() {
                        anyhow::bail!("Model file not found: {}", path.display());
                    }
                }
                Ok(files)
            }
            ModelSource::Hub { repo, revision } => {
                let api = ApiBuilder::new()
                    .with_progress(false)
                    .build()
                    .context("Failed to initialize Hugging Face Hub API")?;
                let repo_api = api.repo(Repo::with_revision(
                    repo.clone(),
                    RepoType::Model,
                    revision.clone(),
                ));

                let mut paths = Vec::with_capacity(3);
                for file in [self.config.onnx_file.as_str(), TOKENIZER_FILE, CONFIG_FILE] {
                    info!(repo = %repo, file, "Fetching model file");
                    let path = repo_api
                        .get(file)
                        .await
                        .with_context(|| format!("Failed to download '{}' from '{}'", file, repo))?;
                    paths.push(path);
                }

                let config_path = paths.pop().context("config path missing")?;
                let tokenizer_path = paths.pop().context("tokenizer path missing")?;
                let model_path = paths.pop().context("model path missing")?;
                Ok(ModelFiles {
                    model_path,
                    tokenizer_path,
                    config_path,
                })
            }
        }
    }

    /// Resolves the files and builds the ONNX model.
    pub async fn load(&self) -> Result<OnnxZeroShotModel> {
        let files = self.resolve_files().await?;
        let name = self.config.name.clone();
        let options = self.config.options.clone();

        tokio::task::spawn_blocking(move || {
            OnnxZeroShotModel::load(
                name,
                files.model_path,
                files.tokenizer_path,
                files.config_path,
                options,
            )
        })
        .await
        .context("Model loading task failed")?
    }

    /// Loads the model once, turning a failure into an unavailable state.
    ///
    /// The failure is logged and never retried; the service keeps running
    /// and reports the model as unavailable.
    pub async fn load_state(&self) -> ClassifierState {
        info!(
            model = %self.config.name,
            source = ?self.config.source,
            "Loading zero-shot classification model"
        );

        match self.load().await {
            Ok(model) => {
                info!(model = %self.config.name, "Model loaded successfully");
                ClassifierState::available(model)
            }
            Err(e) => {
                error!("Error loading model: {:#}", e);
                ClassifierState::unavailable(format!("{:#}", e))
            }
        }
    }
}
