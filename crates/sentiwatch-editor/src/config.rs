//! Editor and watcher configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quiet period before an analysis pass runs
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Editor surface settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Visual theme name
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Placeholder shown while the document is empty
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_theme() -> String {
    "snow".to_string()
}

fn default_placeholder() -> String {
    "Type here...".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            placeholder: default_placeholder(),
        }
    }
}

/// What to do with a scoring result that resolves after a newer edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StalePolicy {
    /// Whichever call resolves last is displayed
    #[default]
    LastWriteWins,

    /// Results for text that has since been edited are dropped
    DiscardStale,
}

/// Analyze-on-edit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Handling of overlapping scoring calls
    #[serde(default)]
    pub stale_policy: StalePolicy,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            stale_policy: StalePolicy::default(),
        }
    }
}

impl WatcherConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }
}
