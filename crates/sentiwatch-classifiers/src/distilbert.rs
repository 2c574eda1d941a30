//! Candle/HuggingFace-backed DistilBERT sentiment pipeline.

use crate::factory::{PipelineFactory, Task};
use crate::model_config::ModelSpec;
use crate::scorer::Scorer;
use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use sentiwatch_core::{Error, Result, ScoreResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};

/// Engine that builds DistilBERT scorers from local directories or the Hub.
pub struct CandleFactory {
    spec: ModelSpec,
}

impl CandleFactory {
    pub fn new(spec: ModelSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl PipelineFactory for CandleFactory {
    async fn create_pipeline(&self, task: Task, model_id: &str) -> Result<Arc<dyn Scorer>> {
        tracing::info!(%task, model = %model_id, device = %self.spec.device, "Creating Candle pipeline");

        // Hub downloads and weight loading block; keep them off the runtime workers
        let spec = self.spec.clone();
        let model_id = model_id.to_string();
        let scorer = tokio::task::spawn_blocking(move || DistilBertScorer::load(&model_id, &spec))
            .await
            .map_err(|e| Error::model_load(format!("Model loading task failed: {}", e)))??;

        Ok(Arc::new(scorer))
    }

    fn available_models(&self) -> Vec<String> {
        vec![self.spec.model_ref()]
    }
}

/// DistilBERT sequence classifier returning the top-k labels.
pub struct DistilBertScorer {
    name: String,
    inner: Arc<DistilBertInner>,
}

struct DistilBertInner {
    tokenizer: Tokenizer,
    model: DistilBertModel,
    pre_classifier: Option<Linear>,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
    top_k: usize,
}

impl DistilBertScorer {
    /// Load a scorer synchronously. `model_id` is either an existing directory
    /// or a Hugging Face repo id.
    pub fn load(model_id: &str, spec: &ModelSpec) -> Result<Self> {
        let model_dir = resolve_model_dir(model_id, &spec.revision)?;

        let config_path = model_dir.join("config.json");
        let config_str = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::model_load(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        let config_json: serde_json::Value = serde_json::from_str(&config_str)?;
        let distilbert_config: DistilBertConfig = serde_json::from_str(&config_str)
            .map_err(|e| Error::model_load(format!("Failed to parse DistilBERT config: {}", e)))?;

        let hidden_size = config_json
            .get("dim")
            .or_else(|| config_json.get("hidden_size"))
            .and_then(|v| v.as_u64())
            .unwrap_or(768) as usize;
        let labels = labels_from_config(&config_json);

        let device = get_device(&spec.device)?;
        let vb = load_var_builder(&model_dir, &device)?;

        let model = DistilBertModel::load(vb.pp("distilbert"), &distilbert_config)
            .map_err(|e| Error::model_load(format!("Failed to load DistilBERT model: {}", e)))?;

        let pre_classifier = candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier")).ok();
        if pre_classifier.is_none() {
            tracing::debug!("No pre_classifier layer in checkpoint, using raw [CLS] embedding");
        }

        let classifier = candle_nn::linear(hidden_size, labels.len(), vb.pp("classifier"))
            .map_err(|e| {
                Error::model_load(format!("Checkpoint has no sequence classification head: {}", e))
            })?;

        let mut tokenizer = load_tokenizer(&model_dir)?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: spec.max_length,
                ..Default::default()
            }))
            .map_err(|e| Error::model_load(format!("Invalid truncation settings: {}", e)))?;

        tracing::info!(
            model = %model_id,
            labels = ?labels,
            "Loaded DistilBERT sentiment classifier"
        );

        Ok(Self {
            name: model_id.to_string(),
            inner: Arc::new(DistilBertInner {
                tokenizer,
                model,
                pre_classifier,
                classifier,
                device,
                labels,
                top_k: spec.top_k,
            }),
        })
    }
}

#[async_trait]
impl Scorer for DistilBertScorer {
    async fn score(&self, text: &str) -> Result<Vec<ScoreResult>> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        tokio::task::spawn_blocking(move || inner.forward(&text))
            .await
            .map_err(|e| Error::scoring(format!("Inference task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl DistilBertInner {
    fn forward(&self, text: &str) -> Result<Vec<ScoreResult>> {
        let start = Instant::now();

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let input_ids = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to create input tensor: {}", e)))?;

        // DistilBERT masks positions where the mask is non-zero
        let inverted_mask: Vec<u8> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| u8::from(x == 0))
            .collect();
        let attention_mask = Tensor::new(inverted_mask.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to create attention mask: {}", e)))?;

        let hidden_states = self
            .model
            .forward(&input_ids, &attention_mask)
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

        let cls_embedding = hidden_states
            .i((0, 0, ..))
            .and_then(|t| t.unsqueeze(0))
            .map_err(|e| Error::classifier(format!("Failed to get CLS token: {}", e)))?;

        let pooled = match &self.pre_classifier {
            Some(pre_classifier) => pre_classifier
                .forward(&cls_embedding)
                .and_then(|t| t.relu())
                .map_err(|e| Error::classifier(format!("Pre-classifier failed: {}", e)))?,
            None => cls_embedding,
        };

        let logits = self
            .classifier
            .forward(&pooled)
            .map_err(|e| Error::classifier(format!("Classification head failed: {}", e)))?;

        let probs: Vec<f32> = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1())
            .map_err(|e| Error::classifier(format!("Softmax failed: {}", e)))?;

        tracing::trace!(latency_us = start.elapsed().as_micros() as u64, "DistilBERT forward pass");

        Ok(rank_scores(&self.labels, &probs, self.top_k))
    }
}

fn resolve_model_dir(model_id: &str, revision: &str) -> Result<PathBuf> {
    let local = Path::new(model_id);
    if local.is_dir() {
        return Ok(local.to_path_buf());
    }

    tracing::info!(repo = %model_id, %revision, "Downloading model from HuggingFace");

    let api = hf_hub::api::sync::Api::new()
        .map_err(|e| Error::model_load(format!("Failed to initialize HuggingFace API: {}", e)))?;
    let repo = api.repo(hf_hub::Repo::with_revision(
        model_id.to_string(),
        hf_hub::RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo
        .get("config.json")
        .map_err(|e| Error::model_load(format!("Failed to download config.json: {}", e)))?;
    repo.get("model.safetensors")
        .map_err(|e| Error::model_load(format!("Failed to download model.safetensors: {}", e)))?;

    let has_tokenizer = ["tokenizer.json", "vocab.txt"].iter().any(|file| match repo.get(file) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(%file, error = %e, "Tokenizer file not available");
            false
        }
    });
    if !has_tokenizer {
        return Err(Error::model_load(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::model_load("Invalid cache path"))?;

    tracing::debug!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

pub(crate) fn get_device(device: &str) -> Result<Device> {
    match device.to_lowercase().as_str() {
        "cuda" | "cuda:0" => Device::new_cuda(0)
            .map_err(|e| Error::model_load(format!("Failed to initialize CUDA: {}", e))),
        "mps" | "metal" => Device::new_metal(0)
            .map_err(|e| Error::model_load(format!("Failed to initialize Metal: {}", e))),
        "cpu" => Ok(Device::Cpu),
        other => Err(Error::config(format!("Unknown device '{}'", other))),
    }
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join("model.safetensors");
    if !weights_path.exists() {
        return Err(Error::model_load(format!(
            "model.safetensors not found in {}",
            model_dir.display()
        )));
    }

    // Safety: the weights file is not modified while mapped
    let vb = unsafe {
        VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)
            .map_err(|e| Error::model_load(format!("Failed to load weights: {}", e)))?
    };

    Ok(vb)
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json = model_dir.join("tokenizer.json");
    if tokenizer_json.exists() {
        return Tokenizer::from_file(&tokenizer_json)
            .map_err(|e| Error::model_load(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_dir.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(|e| Error::model_load(format!("Failed to build WordPiece model: {}", e)))?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), 102),
            ("[CLS]".to_string(), 101),
        )));

        return Ok(tokenizer);
    }

    Err(Error::model_load(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_dir.display()
    )))
}

/// Labels ordered by class index, read from `id2label`.
pub(crate) fn labels_from_config(config: &serde_json::Value) -> Vec<String> {
    let mut pairs: Vec<(usize, String)> = config
        .get("id2label")
        .and_then(|v| v.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(idx, label)| Some((idx.parse().ok()?, label.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();
    pairs.sort_by_key(|(idx, _)| *idx);

    let contiguous = pairs.iter().enumerate().all(|(pos, (idx, _))| pos == *idx);
    if pairs.is_empty() || !contiguous {
        let num_labels = config
            .get("num_labels")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(pairs.len().max(2));
        return default_labels(num_labels);
    }

    pairs.into_iter().map(|(_, label)| label).collect()
}

fn default_labels(num_labels: usize) -> Vec<String> {
    match num_labels {
        0..=2 => vec!["NEGATIVE".to_string(), "POSITIVE".to_string()],
        n => (0..n).map(|idx| format!("LABEL_{}", idx)).collect(),
    }
}

/// Pair labels with probabilities, best first. `top_k == 0` keeps all.
pub(crate) fn rank_scores(labels: &[String], probs: &[f32], top_k: usize) -> Vec<ScoreResult> {
    let mut ranked: Vec<ScoreResult> = labels
        .iter()
        .zip(probs)
        .map(|(label, &score)| ScoreResult::new(label.clone(), score))
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    if top_k > 0 {
        ranked.truncate(top_k);
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_from_sst2_config() {
        let config = serde_json::json!({
            "id2label": { "1": "POSITIVE", "0": "NEGATIVE" }
        });
        assert_eq!(labels_from_config(&config), vec!["NEGATIVE", "POSITIVE"]);
    }

    #[test]
    fn test_labels_fall_back_when_missing() {
        assert_eq!(
            labels_from_config(&serde_json::json!({})),
            vec!["NEGATIVE", "POSITIVE"]
        );
        assert_eq!(
            labels_from_config(&serde_json::json!({ "num_labels": 3 })),
            vec!["LABEL_0", "LABEL_1", "LABEL_2"]
        );
    }

    #[test]
    fn test_rank_scores_top_one() {
        let labels = vec!["NEGATIVE".to_string(), "POSITIVE".to_string()];
        let ranked = rank_scores(&labels, &[0.02, 0.98], 1);

        assert_eq!(ranked, vec![ScoreResult::new("POSITIVE", 0.98)]);
    }

    #[test]
    fn test_rank_scores_all() {
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let ranked = rank_scores(&labels, &[0.2, 0.5, 0.3], 0);

        let order: Vec<&str> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_unknown_device_rejected() {
        assert!(matches!(get_device("tpu"), Err(Error::Config(_))));
        assert!(matches!(get_device("CPU"), Ok(Device::Cpu)));
    }

    #[test]
    fn test_missing_local_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = load_var_builder(dir.path(), &Device::Cpu).err().unwrap();
        assert!(matches!(err, Error::ModelLoad(_)));
    }
}
