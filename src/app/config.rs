//! Configuration for the grid client

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{DefaultColors, Rgb};

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial grid height in rows
    pub rows: usize,
    /// Initial grid width in columns
    pub cols: usize,
    /// Cell width in pixels, as measured by the font layer
    pub cell_width: f32,
    /// Cell height in pixels, as measured by the font layer
    pub cell_height: f32,
    /// Ticks per second
    pub target_tps: u32,
    /// Alpha of cell backgrounds (0.0 - 1.0)
    pub transparency: f32,
    /// Cursor settings
    pub cursor: CursorConfig,
    /// Built-in default colors
    pub colors: ColorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            cell_width: 9.0,
            cell_height: 18.0,
            target_tps: 60,
            transparency: 1.0,
            cursor: CursorConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

/// Cursor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Seconds a cursor move takes, 0 disables the animation
    pub animation_time: f32,
    /// Honor the blink timings of the active mode
    pub blink: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            animation_time: 0.08,
            blink: true,
        }
    }
}

/// Default colors used until the editor sends its own
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub foreground: Rgb,
    pub background: Rgb,
    pub special: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let colors = DefaultColors::default();
        Self {
            foreground: colors.foreground,
            background: colors.background,
            special: colors.special,
        }
    }
}

impl From<ColorConfig> for DefaultColors {
    fn from(colors: ColorConfig) -> Self {
        Self {
            foreground: colors.foreground,
            background: colors.background,
            special: colors.special,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/gridray/config.json
        if let Some(config_dir) = dirs_config_path() {
            let config_path = config_dir.join("config.json");
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), "ignoring config: {}", e)
                    },
                }
            }
        }
        Self::default()
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_tps == 0 {
            return Err(ConfigError::Invalid("target_tps must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.transparency) {
            return Err(ConfigError::Invalid(format!(
                "transparency {} is outside 0..=1",
                self.transparency
            )));
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.cell_width) || !positive(self.cell_height) {
            return Err(ConfigError::Invalid(format!(
                "cell size {}x{} must be positive",
                self.cell_width, self.cell_height
            )));
        }
        if self.cursor.animation_time.is_nan() || self.cursor.animation_time < 0.0 {
            return Err(ConfigError::Invalid(
                "cursor.animation_time must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Time between two ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_tps.max(1)))
    }
}

/// Get the configuration directory path
fn dirs_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("gridray"))
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!((config.rows, config.cols), (24, 80));
        assert_eq!(config.target_tps, 60);
        assert_eq!(config.transparency, 1.0);
        assert!(config.cursor.blink);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tick_interval() {
        let config = Config {
            target_tps: 50,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_config_validate() {
        let bad_tps = Config {
            target_tps: 0,
            ..Default::default()
        };
        assert!(matches!(bad_tps.validate(), Err(ConfigError::Invalid(_))));

        let bad_alpha = Config {
            transparency: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad_alpha.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"cols": 120, "cursor": {"blink": false}}"#).unwrap();
        assert_eq!(config.cols, 120);
        assert_eq!(config.rows, 24);
        assert!(!config.cursor.blink);
        assert_eq!(config.cursor.animation_time, 0.08);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            transparency: 0.8,
            colors: ColorConfig {
                background: Rgb::new(0x28, 0x2c, 0x34),
                ..Default::default()
            },
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_config_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ rows: ").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Json(_))));

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, r#"{"transparency": -1.0}"#).unwrap();
        assert!(matches!(Config::load(&invalid), Err(ConfigError::Invalid(_))));
    }
}
