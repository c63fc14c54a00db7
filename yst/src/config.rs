//! Engine configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Process-wide evaluation settings, fixed before any template is evaluated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render operation failures as inline error panels; when false they propagate
    #[serde(rename = "alert-errors")]
    pub alert_errors: bool,

    /// Allow space-separated set expressions and the `e0`/`values0` bindings
    #[serde(rename = "allow-multi-set")]
    pub allow_multi_set: bool,

    /// Log every entry template in pretty-printed form
    pub debug: bool,

    /// Page-integration settings, carried for hosts but unused by the engine
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alert_errors: true,
            allow_multi_set: false,
            debug: false,
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Strict mode: every operation failure propagates to the caller
    pub fn strict() -> Self {
        Self {
            alert_errors: false,
            ..Self::default()
        }
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: ./yst.yml
        let local_config = PathBuf::from("yst.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/yst/yst.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("yst").join("yst.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Presentation toggles owned by the page-integration layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show a "processing" indicator while templates render
    #[serde(rename = "show-processing-box")]
    pub show_processing_box: bool,

    /// Hide the page body until rendering completes
    #[serde(rename = "hide-body-on-process")]
    pub hide_body_on_process: bool,

    /// Report how long rendering took
    #[serde(rename = "show-processing-time")]
    pub show_processing_time: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_processing_box: true,
            hide_body_on_process: false,
            show_processing_time: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.alert_errors);
        assert!(!config.allow_multi_set);
        assert!(!config.debug);
        assert!(config.ui.show_processing_box);
    }

    #[test]
    fn test_strict_disables_alerts() {
        assert!(!Config::strict().alert_errors);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("allow-multi-set: true\n").unwrap();
        assert!(config.allow_multi_set);
        assert!(config.alert_errors);
        assert!(config.ui.show_processing_box);
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("yst.yml");

        let config = Config {
            alert_errors: false,
            allow_multi_set: true,
            debug: true,
            ui: UiConfig {
                show_processing_time: true,
                ..Default::default()
            },
        };
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
