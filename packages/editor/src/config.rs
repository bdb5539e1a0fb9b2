use crate::change::DEFAULT_BLOCK;
use crate::errors::EditorResult;
use crate::history::{DEFAULT_MAX_LEVELS, DEFAULT_MERGE_WINDOW};
use crate::normalizer::DEFAULT_ITERATION_BASE;
use folio_model::SerializeOptions;
use folio_schema::SchemaConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub serializer: SerializeOptions,

    /// Block type commands create when they need a new block
    #[serde(default = "default_block")]
    pub default_block: String,

    /// Extra schema layers, applied on top of the core layer
    #[serde(default)]
    pub schema: SchemaConfig,
}

fn default_block() -> String {
    DEFAULT_BLOCK.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,

    #[serde(default = "default_merge_window_ms")]
    pub merge_window_ms: u64,
}

fn default_max_levels() -> usize {
    DEFAULT_MAX_LEVELS
}

fn default_merge_window_ms() -> u64 {
    DEFAULT_MERGE_WINDOW.as_millis() as u64
}

impl HistoryConfig {
    pub fn merge_window(&self) -> Duration {
        Duration::from_millis(self.merge_window_ms)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_levels: default_max_levels(),
            merge_window_ms: default_merge_window_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeConfig {
    /// Repairs allowed per node, before adding its child count
    #[serde(default = "default_iteration_base")]
    pub iteration_base: usize,
}

fn default_iteration_base() -> usize {
    DEFAULT_ITERATION_BASE
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            iteration_base: default_iteration_base(),
        }
    }
}

impl EditorConfig {
    /// Load `folio.config.json` from `dir`, or defaults if there is none
    pub fn load(dir: impl AsRef<Path>) -> EditorResult<Self> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::load_file(&config_path)
        } else {
            Ok(EditorConfig::default())
        }
    }

    pub fn load_file(path: impl AsRef<Path>) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history: HistoryConfig::default(),
            normalize: NormalizeConfig::default(),
            serializer: SerializeOptions::default(),
            default_block: default_block(),
            schema: SchemaConfig::default(),
        }
    }
}
