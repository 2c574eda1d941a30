//! Application configuration

use crate::cli::ModelArgs;
use sentiwatch_classifiers::{ModelSpec, SourceKind};
use sentiwatch_editor::{EditorConfig, StalePolicy, WatcherConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the binary needs, loaded from YAML with CLI overrides on top
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scoring model
    #[serde(default)]
    pub model: ModelSpec,

    /// Analyze-on-edit behaviour
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Editor surface
    #[serde(default)]
    pub editor: EditorConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides.
    ///
    /// An explicitly given file must exist; the default location is optional.
    pub fn load(args: &ModelArgs) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_model_args(args);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn apply_model_args(&mut self, args: &ModelArgs) {
        if let Some(model) = &args.model {
            self.model.id = model.clone();
            if self.model.source == SourceKind::Lexicon {
                self.model.source = SourceKind::HuggingFace;
            }
        }

        if let Some(local) = &args.local {
            self.model.source = SourceKind::Local;
            self.model.path = Some(local.clone());
        }

        if args.lexicon {
            self.model.source = SourceKind::Lexicon;
        }

        if let Some(device) = &args.device {
            self.model.device = device.clone();
        }

        if let Some(top_k) = args.top_k {
            self.model.top_k = top_k;
        }
    }

    pub fn apply_watcher_args(&mut self, debounce_ms: Option<u64>, discard_stale: bool) {
        if let Some(debounce_ms) = debounce_ms {
            self.watcher.debounce_ms = debounce_ms;
        }

        if discard_stale {
            self.watcher.stale_policy = StalePolicy::DiscardStale;
        }
    }
}

/// `<config dir>/sentiwatch/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sentiwatch").join("config.yaml"))
}
