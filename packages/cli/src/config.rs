use folio_editor::{EditorConfig, DEFAULT_CONFIG_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `folio.config.json`: editor settings plus where documents live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory searched for documents
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    #[serde(flatten)]
    pub editor: EditorConfig,
}

fn default_src_dir() -> String {
    "docs".to_string()
}

impl Config {
    /// Read `folio.json` from `cwd`
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            // A missing file means defaults
            Ok(Config::default())
        }
    }

    /// `src_dir` resolved against `cwd`
    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            editor: EditorConfig::default(),
        }
    }
}
