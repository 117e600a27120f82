use crate::catalog::RecommendationTable;
use crate::types::AnalysisState;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("reveal delay ({reveal_ms} ms) must be shorter than complete delay ({complete_ms} ms)")]
    RevealNotBeforeComplete { reveal_ms: u64, complete_ms: u64 },
    #[error("trust score {0} is above 100")]
    TrustScoreOutOfRange(u8),
    #[error("landmark reveal spread must be a finite number of seconds >= 0, got {0}")]
    BadRevealSpread(f32),
    #[error("landmark point count {count} exceeds the maximum of {max}")]
    TooManyPoints { count: usize, max: usize },
    #[error("invalid accent colour '{0}', expected #RRGGBB")]
    BadColour(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub timing: TimingConfig,
    pub analysis: AnalysisState,
    pub landmarks: LandmarkConfig,
    pub catalog: RecommendationTable,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub mirror: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub reveal_delay_ms: u64,
    pub complete_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkConfig {
    pub point_count: usize,
    pub max_reveal_delay_secs: f32, // stagger between individual dots
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub accent_hex: String, // e.g. "#C9A227"
    pub dot_size: usize,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { index: 0, mirror: true }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: 500,
            complete_delay_ms: 3500,
        }
    }
}

impl TimingConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn complete_delay(&self) -> Duration {
        Duration::from_millis(self.complete_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal_delay_ms >= self.complete_delay_ms {
            return Err(ConfigError::RevealNotBeforeComplete {
                reveal_ms: self.reveal_delay_ms,
                complete_ms: self.complete_delay_ms,
            });
        }
        Ok(())
    }
}

impl Default for LandmarkConfig {
    fn default() -> Self {
        Self {
            point_count: 24,
            max_reveal_delay_secs: 1.5,
        }
    }
}

impl LandmarkConfig {
    pub const MAX_POINTS: usize = 512;

    pub fn validate(&self) -> Result<(), ConfigError> {
        let spread = self.max_reveal_delay_secs;
        if !spread.is_finite() || spread < 0.0 {
            return Err(ConfigError::BadRevealSpread(spread));
        }
        if self.point_count > Self::MAX_POINTS {
            return Err(ConfigError::TooManyPoints {
                count: self.point_count,
                max: Self::MAX_POINTS,
            });
        }
        Ok(())
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "K-EYEWARE LOOKFIT".to_string(),
            accent_hex: "#C9A227".to_string(),
            dot_size: 4,
        }
    }
}

impl UiConfig {
    pub fn accent_rgb(&self) -> Result<(u8, u8, u8), ConfigError> {
        parse_hex(&self.accent_hex).ok_or_else(|| ConfigError::BadColour(self.accent_hex.clone()))
    }
}

pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "lookfit.json";

    /// Loads the config at `path`, falling back to defaults when the file is
    /// missing or unreadable, and writes it back so new fields show up.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    log::info!("Loaded configuration from {}", path.display());
                    c
                }
                Err(e) => {
                    log::warn!("Error parsing config: {}. Loading defaults.", e);
                    Self::default()
                }
            }
        } else {
            log::info!("Configuration file not found. Creating default at {}", path.display());
            Self::default()
        };

        config.validate()?;
        config.save_to(path)?;

        Ok(config)
    }

    /// Reads and validates the config at `path` without touching the file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.landmarks.validate()?;
        if self.analysis.trust_score > 100 {
            return Err(ConfigError::TrustScoreOutOfRange(self.analysis.trust_score));
        }
        self.ui.accent_rgb()?;
        Ok(())
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }
}
