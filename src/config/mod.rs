use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::schedule::{LayoutOptions, Minute};

pub const MIN_FONT_SCALE: f32 = 0.75;
pub const MAX_FONT_SCALE: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeFormat {
    #[default]
    HoursMinutes,  // "3h 15m"
    Decimal,       // "3.25h"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClockFormat {
    #[default]
    Hour24,      // "14:30"
    Hour12,      // "2:30pm"
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Minute-of-day shown at the left edge of the timeline
    #[serde(default = "default_base_minute")]
    pub base_minute: Minute,
    #[serde(default)]
    pub clock_format: ClockFormat,
    #[serde(default)]
    pub time_format: TimeFormat,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold: Minute,
    #[serde(default)]
    pub window_position: Option<[f32; 2]>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_minute() -> Minute {
    8 * 60  // 08:00
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_overlap_threshold() -> Minute {
    crate::schedule::LayoutOptions::default().overlap_threshold
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_minute: default_base_minute(),
            clock_format: ClockFormat::Hour24,
            time_format: TimeFormat::HoursMinutes,
            font_scale: default_font_scale(),
            overlap_threshold: default_overlap_threshold(),
            window_position: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            let mut config: Config = serde_json::from_str(&contents)
                .context("Failed to parse config file")?;
            config.base_minute = crate::schedule::normalize(config.base_minute);
            config.font_scale = clamp_font_scale(config.font_scale);
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            overlap_threshold: self.overlap_threshold.max(0),
        }
    }

    fn config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.json"))
    }

    /// Directory for the schedule store, logs and exports
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }
}

/// Keep a zoom factor usable; NaN falls back to 1.0
pub fn clamp_font_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return default_font_scale();
    }
    scale.clamp(MIN_FONT_SCALE, MAX_FONT_SCALE)
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "dayline", "dayline")
        .context("Could not determine config directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_minute, 480);
        assert_eq!(config.overlap_threshold, 5);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_minute: 6 * 60 + 30,
            clock_format: ClockFormat::Hour12,
            window_position: Some([120.0, 80.0]),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn older_files_fill_in_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "base_minute": 1500, "time_format": "Decimal" }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_minute, 60);
        assert_eq!(config.time_format, TimeFormat::Decimal);
        assert_eq!(config.clock_format, ClockFormat::Hour24);
        assert_eq!(config.overlap_threshold, 5);
    }

    #[test]
    fn hand_edited_font_scale_is_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{ "font_scale": 0.0 }"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().font_scale, MIN_FONT_SCALE);

        fs::write(&path, r#"{ "font_scale": -2.0 }"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().font_scale, MIN_FONT_SCALE);

        fs::write(&path, r#"{ "font_scale": 40.0 }"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().font_scale, MAX_FONT_SCALE);

        fs::write(&path, r#"{ "font_scale": 1.25 }"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().font_scale, 1.25);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn negative_threshold_is_clamped() {
        let config = Config {
            overlap_threshold: -3,
            ..Config::default()
        };
        assert_eq!(config.layout_options().overlap_threshold, 0);
    }
}
