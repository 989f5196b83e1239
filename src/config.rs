use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CIRCUIT_FINDER_CONFIG";
/// Config file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "circuit-finder.json";

/// Window and table defaults. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Column offered in the side-panel equality filter.
    pub group_column: String,
    /// How many leading columns are pre-selected for search.
    pub default_search_columns: usize,
    pub search_export_file: String,
    pub filter_export_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Circuit Finder – Route Data Search".to_string(),
            window_size: [1280.0, 860.0],
            min_window_size: [640.0, 420.0],
            group_column: "Operadora".to_string(),
            default_search_columns: 3,
            search_export_file: "resultados_pesquisa.csv".to_string(),
            filter_export_file: "resultados_filtrados.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `$CIRCUIT_FINDER_CONFIG`, else `./circuit-finder.json`, else defaults.
    /// A broken file is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("using config {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE);
        local.exists().then_some(local)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
