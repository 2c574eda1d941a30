//! Model selection and inference settings

use crate::distilbert::CandleFactory;
use crate::factory::PipelineFactory;
use crate::lexicon::{LexiconFactory, LEXICON_MODEL_ID};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Where model artifacts come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Download from HuggingFace Hub
    #[default]
    HuggingFace,

    /// Load from a local directory holding config.json, weights, tokenizer
    Local,

    /// Built-in keyword lexicon, no model files
    Lexicon,
}

/// Configuration for the scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Hugging Face repo id
    #[serde(default = "default_model_id")]
    pub id: String,

    /// Model source
    #[serde(default)]
    pub source: SourceKind,

    /// Hub revision (branch, tag, or commit)
    #[serde(default = "default_revision")]
    pub revision: String,

    /// Model directory for `source: local`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Device to run on (cpu, cuda, metal)
    #[serde(default = "default_device")]
    pub device: String,

    /// Maximum sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Number of labels returned per call, best first
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

fn default_top_k() -> usize {
    1
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            id: default_model_id(),
            source: SourceKind::default(),
            revision: default_revision(),
            path: None,
            device: default_device(),
            max_length: default_max_length(),
            top_k: default_top_k(),
        }
    }
}

impl ModelSpec {
    /// The identifier handed to the factory: the directory for local models,
    /// the repo id otherwise.
    pub fn model_ref(&self) -> String {
        match (self.source, &self.path) {
            (SourceKind::Local, Some(path)) => path.to_string_lossy().into_owned(),
            (SourceKind::Lexicon, _) => LEXICON_MODEL_ID.to_string(),
            _ => self.id.clone(),
        }
    }

    /// Build the inference engine matching this spec
    pub fn factory(&self) -> Arc<dyn PipelineFactory> {
        match self.source {
            SourceKind::Lexicon => Arc::new(LexiconFactory),
            SourceKind::HuggingFace | SourceKind::Local => Arc::new(CandleFactory::new(self.clone())),
        }
    }
}
