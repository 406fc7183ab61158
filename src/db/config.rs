use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::utils::DurationFormat;

/// Settings read from `~/.tasktimer/rc`.
///
/// The rc file holds `key=value` lines; `#` starts a comment. Recognised keys:
///
/// - `data.location` - directory holding the snapshot; relative paths are
///   resolved against the rc file's directory
/// - `duration.days`, `duration.hours`, `duration.minutes`, `duration.seconds`
///   - `true`/`false` switches for the units shown in durations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_location: PathBuf,
    pub duration_format: DurationFormat,
}

impl Config {
    /// Base directory for the rc file and the default data location
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".tasktimer"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("rc"))
    }

    /// Load the rc file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let defaults = Self::defaults_in(&Self::base_dir()?);
        if !config_path.exists() {
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::parse(&content, &config_path, defaults)
    }

    fn defaults_in(base_dir: &Path) -> Self {
        Self {
            data_location: base_dir.to_path_buf(),
            duration_format: DurationFormat::default(),
        }
    }

    /// Apply rc file content on top of `defaults`
    pub fn parse(content: &str, config_path: &Path, defaults: Self) -> Result<Self> {
        let mut config = defaults;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("{}:{}: ignoring line without '='", config_path.display(), line_no + 1);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        config_path.parent().unwrap_or(Path::new(".")).join(path)
                    } else {
                        path
                    };
                }
                "duration.days" => config.duration_format.parts.show_days = parse_bool(key, value)?,
                "duration.hours" => config.duration_format.parts.show_hours = parse_bool(key, value)?,
                "duration.minutes" => {
                    config.duration_format.parts.show_minutes = parse_bool(key, value)?
                }
                "duration.seconds" => {
                    config.duration_format.parts.show_seconds = parse_bool(key, value)?
                }
                _ => log::warn!("{}:{}: unknown setting '{}'", config_path.display(), line_no + 1, key),
            }
        }

        let parts = &config.duration_format.parts;
        if !(parts.show_days || parts.show_hours || parts.show_minutes || parts.show_seconds) {
            anyhow::bail!("At least one duration unit must be shown");
        }
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("Invalid value for {}: '{}'. Expected true or false", key, value),
    }
}
