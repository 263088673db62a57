//! Learn Numbers - hear a number, point to it
//!
//! Core modules:
//! - `sim`: Deterministic round/session engine (options, targets, scoring, timers)
//! - `renderer`: Backend-neutral draw lists and the canvas painter
//! - `audio`: Cue ids, the audio sink interface and its backends
//! - `speech`: Phrase-to-clip cache for spoken prompts
//! - `settings`: Game configuration

pub mod audio;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod speech;

pub use error::GameError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Target frame rate for the tick loop
    pub const FRAME_RATE: u32 = 30;

    /// Rounds in one sequence (targets 1 through 10)
    pub const ROUNDS_PER_SEQUENCE: u32 = 10;
    /// Rounds sharing one generated option set
    pub const ROUNDS_PER_BLOCK: u32 = 5;
    /// Options shown per round
    pub const DEFAULT_OPTION_COUNT: usize = 5;

    /// Points for a correct answer
    pub const CORRECT_REWARD: u64 = 10;
    /// Delay between a correct answer and the next round (ms)
    pub const ADVANCE_DELAY_MS: u64 = 1000;
    /// Number of presentation levels before wrapping back to 1
    pub const MAX_LEVEL: u8 = 3;

    /// Feedback box slide-in speed (alpha units per second)
    pub const FEEDBACK_SPEED: f32 = 5.0;
    /// Round fade-in speed (progress units per second)
    pub const TRANSITION_SPEED: f32 = 2.0;
    /// Non-selected options fade at this rate after a correct answer
    pub const FADE_SPEED: f32 = 2.0;
    /// Opacity floor for faded options
    pub const FADE_FLOOR: f32 = 0.25;
    /// How long a wrong pick stays red (seconds)
    pub const INCORRECT_FLASH_SECS: f32 = 0.5;

    /// Logical screen size
    pub const SCREEN_WIDTH: f32 = 1920.0;
    pub const SCREEN_HEIGHT: f32 = 1080.0;
    /// Option box edge length
    pub const OPTION_SIZE: f32 = 300.0;
    /// Horizontal gap between option boxes
    pub const OPTION_GAP: f32 = 50.0;
    /// Top edge of the option row
    pub const OPTION_ROW_Y: f32 = 300.0;

    /// Ball look and motion inside a ball option
    pub const BALL_RADIUS: f32 = 30.0;
    pub const BALL_SPACING: f32 = 60.0;
    /// Drift speed in px/s (1.5 px per frame at 30 Hz)
    pub const BALL_SPEED: f32 = 45.0;
    /// Keep-out margin from the box edge for drifting balls
    pub const BALL_PADDING: f32 = 30.0;
}

/// English word for 1..=10, as spoken in the prompts
pub fn number_word(n: u32) -> Option<&'static str> {
    let word = match n {
        1 => "one",
        2 => "two",
        3 => "three",
        4 => "four",
        5 => "five",
        6 => "six",
        7 => "seven",
        8 => "eight",
        9 => "nine",
        10 => "ten",
        _ => return None,
    };
    Some(word)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_words_cover_targets() {
        for n in 1..=consts::ROUNDS_PER_SEQUENCE {
            assert!(number_word(n).is_some(), "missing word for {n}");
        }
        assert_eq!(number_word(3), Some("three"));
        assert_eq!(number_word(0), None);
        assert_eq!(number_word(11), None);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(1180.0, 800.0, 1.0), 800.0);
    }
}
