use pagebuilder_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `pagebuilder.config.json`: editor settings plus where pages live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding one `<slug>.json` per page
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    #[serde(flatten)]
    pub editor: EditorConfig,
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute path to the pages directory
    pub fn get_pages_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.pages_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            editor: EditorConfig::default(),
        }
    }
}
