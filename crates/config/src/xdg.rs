//! XDG Base Directory support for cmdpanel.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "cmdpanel";

/// Get the configuration directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME/cmdpanel` or `~/.config/cmdpanel`.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine config directory")
}

/// Get the data directory following XDG conventions.
///
/// Returns `$XDG_DATA_HOME/cmdpanel` or `~/.local/share/cmdpanel`.
/// The host keeps its log file here.
pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine data directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_end_with_app_name() {
        if let (Ok(config), Ok(data)) = (get_config_dir(), get_data_dir()) {
            assert!(config.ends_with(APP_NAME));
            assert!(data.ends_with(APP_NAME));
        }
    }
}
