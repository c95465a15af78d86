use eyre::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::recovery::RestoreSource;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default log level for the log file; RUST_LOG still takes precedence
    pub log_level: Option<String>,
    pub session: SessionConfig,
    pub recovery: RecoveryConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stop a run once any single condition is met
    pub stop_on_any_condition: bool,
    pub inebriety_limit: i64,
    /// Zones where adventuring while falling-down drunk is not confirmed
    pub exempt_zones: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stop_on_any_condition: false,
            inebriety_limit: 14,
            exempt_zones: vec!["Camp".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Fraction of maximum HP at or below which recovery runs; 0 disables
    pub hp_threshold: f64,
    pub hp_script: Option<PathBuf>,
    pub script_timeout_ms: u64,
    /// Fraction of maximum MP to restore before adventuring
    pub mp_threshold: f64,
    pub mp_sources: Vec<RestoreSource>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            hp_threshold: 0.0,
            hp_script: None,
            script_timeout_ms: 30000,
            mp_threshold: 0.0,
            mp_sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Extra merchant table merged over the bundled one
    pub coinmasters: Option<PathBuf>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try local file first: ./<project>.yml
        let local_config = PathBuf::from(format!("{}.yml", project_name));
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Then the user location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the session engine cannot work with
    pub fn validate(&self) -> Result<()> {
        for (name, fraction) in [
            ("recovery.hp_threshold", self.recovery.hp_threshold),
            ("recovery.mp_threshold", self.recovery.mp_threshold),
        ] {
            if !(0.0..=1.0).contains(&fraction) {
                bail!("{} must be between 0 and 1, got {}", name, fraction);
            }
        }
        if self.session.inebriety_limit <= 0 {
            bail!("session.inebriety_limit must be positive");
        }
        if let Some(level) = &self.log_level
            && level.parse::<log::LevelFilter>().is_err()
        {
            bail!("log_level must be one of off, error, warn, info, debug, trace; got {}", level);
        }
        Ok(())
    }
}
