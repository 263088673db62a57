//! Top-level error type
//!
//! Each module owns its own error enum; `GameError` wraps them for callers
//! that drive the whole game (the binaries).

use thiserror::Error;

use crate::audio::AudioError;
use crate::settings::ConfigError;
use crate::sim::GeneratorError;
use crate::speech::SpeechError;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("option generation failed: {0}")]
    Generator(#[from] GeneratorError),

    #[error("speech asset unavailable: {0}")]
    Speech(#[from] SpeechError),

    #[error("audio backend failed: {0}")]
    Audio(#[from] AudioError),
}
