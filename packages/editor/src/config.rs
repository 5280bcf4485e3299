use crate::errors::EditorResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagebuilder.config.json";

/// Editor session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo snapshots kept (0 = unlimited)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_true")]
    pub autosave_enabled: bool,

    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,

    /// Version note recorded by the save that precedes every publish
    #[serde(default = "default_pre_publish_note")]
    pub pre_publish_note: String,

    /// Author recorded on saves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_by: Option<String>,
}

fn default_history_capacity() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_autosave_interval_secs() -> u64 {
    30
}

fn default_pre_publish_note() -> String {
    "pre-publish".to_string()
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: &Path) -> EditorResult<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EditorConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(EditorConfig::default())
        }
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            autosave_enabled: true,
            autosave_interval_secs: default_autosave_interval_secs(),
            pre_publish_note: default_pre_publish_note(),
            saved_by: None,
        }
    }
}
