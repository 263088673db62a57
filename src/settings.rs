//! Game settings
//!
//! Read from `game_config.json` on native and LocalStorage on wasm32. A
//! missing or unreadable source falls back to defaults; values that parse but
//! are out of range are reported by `validate`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("option_count must be between 1 and {max}, got {got}")]
    OptionCount { got: usize, max: usize },

    #[error("max_level must be between 1 and {max}, got {got}")]
    MaxLevel { got: u8, max: u8 },

    #[error("start_level {start} is outside 1..={max_level}")]
    StartLevel { start: u8, max_level: u8 },

    #[error("frame_rate must be positive, got {0}")]
    FrameRate(u32),

    #[error("{name} must be within 0.0..=1.0, got {value}")]
    Volume { name: &'static str, value: f32 },

    #[error("screen size {width}x{height} cannot fit {option_count} options")]
    Screen {
        width: u32,
        height: u32,
        option_count: usize,
    },

    #[error("cannot read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Rounds ===
    /// Choices shown per round
    pub option_count: usize,
    /// Pause between a correct answer and the next round (ms)
    pub advance_delay_ms: u64,
    /// Points per correct answer
    pub reward: u64,
    /// Highest presentation level before wrapping to 1
    pub max_level: u8,
    /// Level a fresh session starts at
    pub start_level: u8,
    /// Drop wrong clicks while the feedback channel is still playing
    pub gate_incorrect_feedback: bool,
    /// Keep the score when moving on to the next level
    pub carry_score_across_levels: bool,
    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,

    // === Display ===
    pub frame_rate: u32,
    pub screen_width: u32,
    pub screen_height: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Where generated speech clips live (native)
    pub speech_cache_dir: String,

    // === Demo ===
    /// Sequences the headless demo plays before exiting
    pub demo_sequences: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            option_count: consts::DEFAULT_OPTION_COUNT,
            advance_delay_ms: consts::ADVANCE_DELAY_MS,
            reward: consts::CORRECT_REWARD,
            max_level: consts::MAX_LEVEL,
            start_level: 1,
            gate_incorrect_feedback: true,
            carry_score_across_levels: false,
            seed: None,

            frame_rate: consts::FRAME_RATE,
            screen_width: consts::SCREEN_WIDTH as u32,
            screen_height: consts::SCREEN_HEIGHT as u32,

            master_volume: 0.8,
            sfx_volume: 1.0,
            speech_cache_dir: "assets/sounds".to_string(),

            demo_sequences: 1,
        }
    }
}

impl Settings {
    /// Native config file name, looked up in the working directory
    pub const CONFIG_FILE: &'static str = "game_config.json";

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "learn_numbers_settings";

    /// Check ranges the rest of the game relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.option_count == 0 || self.option_count > consts::ROUNDS_PER_BLOCK as usize {
            return Err(ConfigError::OptionCount {
                got: self.option_count,
                max: consts::ROUNDS_PER_BLOCK as usize,
            });
        }
        if self.max_level == 0 || self.max_level > consts::MAX_LEVEL {
            return Err(ConfigError::MaxLevel {
                got: self.max_level,
                max: consts::MAX_LEVEL,
            });
        }
        if self.start_level == 0 || self.start_level > self.max_level {
            return Err(ConfigError::StartLevel {
                start: self.start_level,
                max_level: self.max_level,
            });
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::FrameRate(self.frame_rate));
        }
        for (name, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Volume { name, value });
            }
        }
        let row_width = self.option_count as f32 * consts::OPTION_SIZE
            + (self.option_count as f32 - 1.0) * consts::OPTION_GAP;
        if row_width > self.screen_width as f32
            || consts::OPTION_ROW_Y + consts::OPTION_SIZE > self.screen_height as f32
        {
            return Err(ConfigError::Screen {
                width: self.screen_width,
                height: self.screen_height,
                option_count: self.option_count,
            });
        }
        Ok(())
    }

    /// Frame duration at the configured rate
    pub fn frame_time(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    /// Effective sound effect gain
    pub fn effective_sfx_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a config file strictly
    pub fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let unreadable = |reason: String| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };
        let json = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        Self::from_json(&json).map_err(|e| unreadable(e.to_string()))
    }

    /// Read a config file, falling back to defaults if it is absent or broken
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No {} found, using default settings", path.display());
            return Self::default();
        }
        match Self::read_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Stored settings are invalid: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load `game_config.json` from the working directory (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_from(Path::new(Self::CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.option_count, 5);
        assert_eq!(s.advance_delay_ms, 1000);
        assert_eq!(s.reward, 10);
        assert!(!s.carry_score_across_levels);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{ "option_count": 3, "seed": 42 }"#).unwrap();
        assert_eq!(s.option_count, 3);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.max_level, 3);
        assert!(s.gate_incorrect_feedback);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let s = Settings {
            option_count: 6,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(ConfigError::OptionCount { got: 6, .. })));

        let s = Settings {
            start_level: 4,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(ConfigError::StartLevel { .. })));

        let s = Settings {
            sfx_volume: 1.5,
            ..Settings::default()
        };
        assert!(matches!(
            s.validate(),
            Err(ConfigError::Volume { name: "sfx_volume", .. })
        ));

        let s = Settings {
            screen_width: 800,
            ..Settings::default()
        };
        assert!(matches!(s.validate(), Err(ConfigError::Screen { .. })));
    }

    #[test]
    fn test_load_from_falls_back_on_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(Settings::load_from(&path), Settings::default());
        assert!(matches!(
            Settings::read_from(&path),
            Err(ConfigError::Unreadable { .. })
        ));

        // Missing file
        file.close().unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_effective_volumes() {
        let s = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Settings::default()
        };
        assert!((s.effective_sfx_volume() - 0.25).abs() < 1e-6);
    }
}
