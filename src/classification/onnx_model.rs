// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX zero-shot classification model
//!
//! Wraps ONNX Runtime around an NLI sequence-classification model
//! (facebook/bart-large-mnli). Each candidate label becomes a hypothesis
//! ("This example is {label}.") that is paired with the input text; the
//! entailment logit of every pair decides how well the label fits.
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Premise/hypothesis pair tokenization with `only_first` truncation
//! - One batched forward pass per request (one row per label)
//! - Single-label (softmax across labels) or multi-label
//!   (entailment vs. contradiction per label) scoring

use anyhow::{Context, Result};
use ndarray::Array2;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};
use tracing::{debug, info, warn};

use super::classifier::{rank_scores, LabelScore, ZeroShotClassifier};
use super::error::ClassifierError;

/// Default hypothesis template; `{}` is replaced by the candidate label.
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// BART's positional embedding limit.
pub const DEFAULT_MAX_LENGTH: usize = 1024;

/// Tuning knobs for [`OnnxZeroShotModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroShotOptions {
    /// Hypothesis template, must contain `{}`
    pub hypothesis_template: String,
    /// Score labels independently instead of as one distribution
    pub multi_label: bool,
    /// Maximum tokens per premise/hypothesis pair
    pub max_length: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for ZeroShotOptions {
    fn default() -> Self {
        Self {
            hypothesis_template: DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
            multi_label: false,
            max_length: DEFAULT_MAX_LENGTH,
            intra_threads: 4,
        }
    }
}

/// The subset of a Hugging Face `config.json` needed to read NLI logits.
#[derive(Debug, Deserialize)]
struct NliConfig {
    id2label: HashMap<String, String>,
}

/// Column indices of the NLI classes in the model's logits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NliLabelIds {
    pub entailment: usize,
    pub contradiction: usize,
    pub num_classes: usize,
}

impl NliLabelIds {
    /// Reads the entailment/contradiction columns from `config.json` contents.
    ///
    /// Labels are matched case-insensitively by prefix (`entail`,
    /// `contradiction`). A missing contradiction label falls back to column 0.
    pub fn from_config_json(json: &str) -> Result<Self> {
        let config: NliConfig =
            serde_json::from_str(json).context("config.json has no usable id2label map")?;

        let mut entailment = None;
        let mut contradiction = None;
        for (id, label) in &config.id2label {
            let id: usize = id
                .parse()
                .with_context(|| format!("id2label key '{}' is not an index", id))?;
            let label = label.to_lowercase();
            if label.starts_with("entail") {
                entailment = Some(id);
            } else if label.starts_with("contradiction") {
                contradiction = Some(id);
            }
        }

        let entailment = entailment.with_context(|| {
            format!(
                "config.json id2label has no entailment label: {:?}",
                config.id2label
            )
        })?;
        let num_classes = config.id2label.len();

        Ok(Self {
            entailment,
            contradiction: contradiction.unwrap_or(0),
            num_classes,
        })
    }
}

/// ONNX-based zero-shot classifier (facebook/bart-large-mnli)
///
/// # Thread Safety
/// The session sits behind `Arc<Mutex<_>>`, so concurrent requests are
/// serialized at the model. Callers are expected to run
/// [`ZeroShotClassifier::classify`] on the blocking pool.
#[derive(Clone)]
pub struct OnnxZeroShotModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    label_ids: NliLabelIds,
    pad_id: u32,
    options: ZeroShotOptions,
}

impl std::fmt::Debug for OnnxZeroShotModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxZeroShotModel")
            .field("model_name", &self.model_name)
            .field("label_ids", &self.label_ids)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OnnxZeroShotModel {
    /// Loads the model from an ONNX graph, `tokenizer.json` and `config.json`.
    ///
    /// Blocking: builds the ONNX session and parses the tokenizer. Run on
    /// the blocking pool from async code.
    ///
    /// # Errors
    /// Returns error if:
    /// - any of the three files is missing or invalid
    /// - `config.json` has no entailment label
    /// - ONNX Runtime initialization fails
    pub fn load<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        config_path: P,
        options: ZeroShotOptions,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();
        let config_path = config_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }
        if !config_path.exists() {
            anyhow::bail!("Model config file not found: {}", config_path.display());
        }
        if !options.hypothesis_template.contains("{}") {
            anyhow::bail!(
                "Hypothesis template must contain '{{}}': {:?}",
                options.hypothesis_template
            );
        }

        let config_json = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let label_ids = NliLabelIds::from_config_json(&config_json)?;

        let session = build_session(model_path, options.intra_threads)?;
        info!(model = %model_name, path = %model_path.display(), "ONNX zero-shot model loaded");

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let pad_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0);

        // Pairs are padded by hand to the longest pair in each request.
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                strategy: TruncationStrategy::OnlyFirst,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to set truncation: {}", e))?;

        debug!(?label_ids, pad_id, "NLI label layout");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            label_ids,
            pad_id,
            options,
        })
    }

    /// Runs one forward pass and returns the raw NLI logits, one row per label.
    fn nli_logits(&self, text: &str, labels: &[String]) -> Result<Vec<Vec<f32>>, ClassifierError> {
        let hypotheses = build_hypotheses(&self.options.hypothesis_template, labels);
        let pairs: Vec<(&str, &str)> = hypotheses.iter().map(|h| (text, h.as_str())).collect();

        let encodings = self
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| ClassifierError::Tokenization(e.to_string()))?;

        let rows = encodings.len();
        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids = Vec::with_capacity(rows * max_len);
        let mut attention_mask = Vec::with_capacity(rows * max_len);
        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(mask.iter().map(|&m| m as i64));

            let padding_needed = max_len - ids.len();
            input_ids.extend(std::iter::repeat(self.pad_id as i64).take(padding_needed));
            attention_mask.extend(std::iter::repeat(0i64).take(padding_needed));
        }

        let input_ids_array = Array2::from_shape_vec((rows, max_len), input_ids)
            .map_err(|e| ClassifierError::Inference(format!("input_ids shape: {}", e)))?;
        let attention_mask_array = Array2::from_shape_vec((rows, max_len), attention_mask)
            .map_err(|e| ClassifierError::Inference(format!("attention_mask shape: {}", e)))?;

        let input_ids_value =
            Value::from_array(input_ids_array).map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let attention_mask_value = Value::from_array(attention_mask_array)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session_guard = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("ONNX session lock poisoned".to_string()))?;
        let outputs = session_guard
            .run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => attention_mask_value
            ])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        // Use index [0]: exports name the logits output differently
        let logits = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let shape = logits.shape().to_vec();
        if shape.len() != 2 || shape[0] != rows || shape[1] <= self.label_ids.entailment {
            return Err(ClassifierError::Inference(format!(
                "unexpected logits shape {:?} (expected [{}, {}])",
                shape, rows, self.label_ids.num_classes
            )));
        }

        Ok((0..rows)
            .map(|row| (0..shape[1]).map(|col| logits[[row, col]]).collect())
            .collect())
    }
}

impl ZeroShotClassifier for OnnxZeroShotModel {
    fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyInput);
        }
        if labels.is_empty() {
            return Err(ClassifierError::NoLabels);
        }

        let logits = self.nli_logits(text, labels)?;
        let scores = score_logits(&logits, self.label_ids, self.options.multi_label)?;

        let mut ranked: Vec<LabelScore> = labels
            .iter()
            .zip(scores)
            .map(|(label, score)| LabelScore::new(label.clone(), score))
            .collect();
        rank_scores(&mut ranked);

        Ok(ranked)
    }
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    // Try CUDA first, fall back to CPU if unavailable
    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("CUDA execution provider initialized");
            Ok(session)
        }
        Err(e) => {
            warn!("CUDA execution provider failed: {}", e);
            warn!("Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(intra_threads)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
        }
    }
}

/// Fills the template once per label.
pub fn build_hypotheses(template: &str, labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|label| template.replace("{}", label))
        .collect()
}

/// Turns NLI logits (one row per label) into label scores.
///
/// Single-label mode normalizes the entailment logits across labels;
/// multi-label mode scores each row on its own. Any non-finite logit is an
/// inference error.
pub fn score_logits(
    logits: &[Vec<f32>],
    label_ids: NliLabelIds,
    multi_label: bool,
) -> Result<Vec<f32>, ClassifierError> {
    let column = label_ids.entailment.max(label_ids.contradiction);
    for (row, values) in logits.iter().enumerate() {
        if values.len() <= column {
            return Err(ClassifierError::Inference(format!(
                "logits row {} has {} columns, need {}",
                row,
                values.len(),
                column + 1
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ClassifierError::Inference(format!(
                "model produced non-finite logit {} in row {}",
                bad, row
            )));
        }
    }

    if multi_label {
        let pairs: Vec<(f32, f32)> = logits
            .iter()
            .map(|row| (row[label_ids.contradiction], row[label_ids.entailment]))
            .collect();
        multi_label_scores(&pairs)
    } else {
        let entailment: Vec<f32> = logits.iter().map(|row| row[label_ids.entailment]).collect();
        softmax(&entailment)
    }
}

/// Numerically stable softmax. Rejects non-finite logits.
pub fn softmax(logits: &[f32]) -> Result<Vec<f32>, ClassifierError> {
    if let Some(bad) = logits.iter().find(|v| !v.is_finite()) {
        return Err(ClassifierError::Inference(format!(
            "cannot normalize non-finite logit {}",
            bad
        )));
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if !(sum > 0.0 && sum.is_finite()) {
        return Err(ClassifierError::Inference(format!(
            "softmax normalizer is {}",
            sum
        )));
    }
    Ok(exps.iter().map(|e| e / sum).collect())
}

/// Entailment probability of each `(contradiction, entailment)` logit pair.
pub fn multi_label_scores(pairs: &[(f32, f32)]) -> Result<Vec<f32>, ClassifierError> {
    pairs
        .iter()
        .map(|&(contradiction, entailment)| Ok(softmax(&[contradiction, entailment])?[1]))
        .collect()
}
