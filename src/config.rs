use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_THRESHOLD: f64 = 0.8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),
    #[error("chart_width must be at least 1")]
    InvalidChartWidth,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum probability for a detection to be kept.
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub chart_width: usize,
    pub bar_char: char,
    pub present_char: char,
    pub absent_char: char,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart_width: 60,
            bar_char: '#',
            present_char: '#',
            absent_char: '.',
        }
    }
}

impl DashboardConfig {
    /// Load from `explicit` if given, otherwise from the user config dir.
    ///
    /// Only an explicitly requested file is allowed to fail; a missing or
    /// broken default file falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::load_default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn load_default() -> Self {
        if let Some(config_path) = Self::config_file_path()
            && let Ok(content) = std::fs::read_to_string(&config_path)
        {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => log::warn!("ignoring {}: {}", config_path.display(), e),
            }
        }
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace the configured threshold, e.g. from a command-line flag.
    pub fn with_threshold(mut self, threshold: Option<f64>) -> Result<Self, ConfigError> {
        if let Some(threshold) = threshold {
            self.analysis.threshold = threshold;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.analysis.threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        if self.output.chart_width == 0 {
            return Err(ConfigError::InvalidChartWidth);
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|mut path| {
            path.push("config.toml");
            path
        })
    }

    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("detlog");
            path
        })
    }
}
