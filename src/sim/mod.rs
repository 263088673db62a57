//! Deterministic round engine
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Time only advances through `tick(dt)`
//! - Seeded RNG only
//! - No rendering or platform dependencies; audio only through `AudioSink`

pub mod choice;
pub mod controller;
pub mod generator;
pub mod layout;
pub mod rect;
pub mod state;
pub mod timer;
pub mod validator;

pub use choice::{BallFace, Choice, ChoiceFace, DigitFace, Mark, Presentation, VisualState};
pub use controller::{GameEvent, InputEvent, Key, RoundController, TickInput};
pub use generator::{GeneratorError, RoundGenerator, ValuePool};
pub use layout::Layout;
pub use rect::Rect;
pub use state::{AnswerOutcome, Feedback, SessionPhase, SessionState, Tone};
pub use timer::OneShot;
pub use validator::{AnswerValidator, ExactMatch, Verdict};
