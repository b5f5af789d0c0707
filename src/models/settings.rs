//! Player-facing configuration: difficulty and theme tables plus `settings.toml`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// RGBA color.
pub type Color = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Per-difficulty tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    /// Note travel speed in world units per second.
    pub speed: f32,
    pub label: &'static str,
    /// Beat interval between chart steps.
    pub beat_step: u32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn settings(self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                speed: 10.0,
                label: "EASY",
                beat_step: 4,
            },
            Difficulty::Medium => DifficultySettings {
                speed: 14.0,
                label: "MEDIUM",
                beat_step: 2,
            },
            Difficulty::Hard => DifficultySettings {
                speed: 18.0,
                label: "HARD",
                beat_step: 1,
            },
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.settings().label.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Neon,
    Vapor,
    Matrix,
}

/// Color palette for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub label: &'static str,
    pub left_hand: Color,
    pub right_hand: Color,
    pub track: Color,
    pub grid: Color,
    pub background: Color,
}

const NEON: ThemePalette = ThemePalette {
    label: "NEON",
    left_hand: [1.0, 0.16, 0.43, 1.0],
    right_hand: [0.0, 0.85, 1.0, 1.0],
    track: [0.07, 0.07, 0.12, 1.0],
    grid: [0.6, 0.2, 1.0, 1.0],
    background: [0.02, 0.02, 0.05, 1.0],
};

const VAPOR: ThemePalette = ThemePalette {
    label: "VAPOR",
    left_hand: [1.0, 0.44, 0.81, 1.0],
    right_hand: [0.4, 0.95, 0.85, 1.0],
    track: [0.18, 0.09, 0.26, 1.0],
    grid: [1.0, 0.63, 0.3, 1.0],
    background: [0.11, 0.03, 0.18, 1.0],
};

const MATRIX: ThemePalette = ThemePalette {
    label: "MATRIX",
    left_hand: [0.0, 1.0, 0.25, 1.0],
    right_hand: [0.75, 1.0, 0.75, 1.0],
    track: [0.0, 0.08, 0.02, 1.0],
    grid: [0.0, 0.55, 0.12, 1.0],
    background: [0.0, 0.0, 0.0, 1.0],
};

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Neon, Theme::Vapor, Theme::Matrix];

    pub fn palette(self) -> &'static ThemePalette {
        match self {
            Theme::Neon => &NEON,
            Theme::Vapor => &VAPOR,
            Theme::Matrix => &MATRIX,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.palette().label.eq_ignore_ascii_case(name))
    }
}

/// Where landmark frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingSourceKind {
    /// Synthetic hands sweeping across the lanes.
    #[default]
    Sweep,
    /// Replay of a recorded JSON-lines landmark trace.
    Trace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    pub source: TrackingSourceKind,
    pub trace_path: Option<PathBuf>,
    /// One Euro filter cutoff at rest (Hz). Lower is smoother.
    pub min_cutoff: f32,
    /// One Euro filter speed coefficient. Higher lags less during swings.
    pub beta: f32,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            source: TrackingSourceKind::Sweep,
            trace_path: None,
            min_cutoff: 1.2,
            beta: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub theme: Theme,
    /// 0.0 to 1.0
    pub master_volume: f32,
    /// Track to play. Without one the game runs on a silent clock.
    pub audio_path: Option<PathBuf>,
    /// Length of the silent track, in seconds.
    pub track_length_secs: f64,
    /// Seeds hard-chart randomness. Unset keeps every session different.
    pub chart_seed: Option<u64>,
    pub hit_radius: f32,
    pub tracking: TrackingSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            theme: Theme::Neon,
            master_volume: 0.5,
            audio_path: None,
            track_length_secs: 140.0,
            chart_seed: None,
            hit_radius: 0.6,
            tracking: TrackingSettings::default(),
        }
    }
}

impl GameSettings {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads settings from `path`, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(settings) => {
                    log::info!("CONFIG: Loaded {:?}", path);
                    settings
                }
                Err(e) => {
                    log::error!("CONFIG: {} ({:?}), using defaults", e, path);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("CONFIG: No settings at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
