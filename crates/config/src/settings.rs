//! Configuration structures for cmdpanel settings.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General host settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Command palette settings
    #[serde(default)]
    pub palette: PaletteSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// General host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Feature modules to activate, in activation order
    #[serde(default = "default_features")]
    pub features: Vec<String>,
}

/// Command palette settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteSettings {
    /// Maximum number of search results to display
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional, defaults to the data directory)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Number of entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_features() -> Vec<String> {
    defaults::FEATURES.iter().map(|f| f.to_string()).collect()
}

fn default_max_results() -> usize {
    defaults::PALETTE_MAX_RESULTS
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::MAX_LOG_ENTRIES
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            features: default_features(),
        }
    }
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
