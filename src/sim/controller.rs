//! Per-frame round controller
//!
//! Drives one play session: opens rounds, lays out the option set, turns
//! input into picks, plays cues and schedules the next round. One `tick` per
//! frame, in a fixed order: input events, then timer and animation.

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::choice::{Choice, VisualState};
use super::generator::RoundGenerator;
use super::layout::Layout;
use super::state::{AnswerOutcome, SessionPhase, SessionState};
use super::timer::OneShot;
use super::validator::{AnswerValidator, ExactMatch};
use crate::GameError;
use crate::audio::{AudioSink, Cue, MusicTrack};
use crate::settings::Settings;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Other,
}

/// Raw player input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Click or tap, in logical screen coordinates
    PointerDown(Vec2),
    /// Window close / back gesture
    QuitRequested,
    KeyPressed(Key),
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Events since the last tick, oldest first
    pub events: Vec<InputEvent>,
    /// Idle/demo mode - the game plays itself
    pub idle_mode: bool,
}

/// Things that happened during a tick, for logging and shells
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted { level: u8 },
    RoundStarted { round: u32, target: u32, level: u8 },
    OptionsGenerated { values: Vec<u32> },
    AnswerAccepted { value: u32, points: u64 },
    AnswerRejected { value: u32 },
    AnswerSuppressed { value: u32 },
    SequenceCompleted { score: u64, next_level: u8 },
    SessionLeft,
}

/// Deferred controller actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    NextRound,
}

pub struct RoundController {
    session: Option<SessionState>,
    choices: Vec<Choice>,
    generator: RoundGenerator,
    validator: Box<dyn AnswerValidator>,
    timer: OneShot<Pending>,
    rng: Pcg32,
    layout: Layout,
    advance_delay: Duration,
    start_level: u8,
    max_level: u8,
    gate_incorrect: bool,
    carry_score: bool,
    quit_requested: bool,
    events: Vec<GameEvent>,
}

impl RoundController {
    /// Build a controller on the title screen. Uses the configured seed, or a
    /// random one.
    pub fn new(settings: &Settings) -> Result<Self, GameError> {
        let seed = settings.seed.unwrap_or_else(rand::random);
        Self::with_seed(settings, seed)
    }

    pub fn with_seed(settings: &Settings, seed: u64) -> Result<Self, GameError> {
        settings.validate()?;
        let generator = RoundGenerator::new(settings.option_count)?;
        log::info!(
            "Controller ready: {} options, seed {seed}",
            generator.option_count()
        );
        Ok(Self {
            session: None,
            choices: Vec::new(),
            generator,
            validator: Box::new(ExactMatch {
                reward: settings.reward,
            }),
            timer: OneShot::new(),
            rng: Pcg32::seed_from_u64(seed),
            layout: Layout::new(settings.screen_width as f32, settings.screen_height as f32),
            advance_delay: Duration::from_millis(settings.advance_delay_ms),
            start_level: settings.start_level,
            max_level: settings.max_level,
            gate_incorrect: settings.gate_incorrect_feedback,
            carry_score: settings.carry_score_across_levels,
            quit_requested: false,
            events: Vec::new(),
        })
    }

    /// Swap the scoring rule
    pub fn with_validator(mut self, validator: Box<dyn AnswerValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Time until the scheduled next round, if one is pending
    pub fn pending_advance(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    /// Set once the player asked to close the game
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start (or restart) a session at the configured level
    pub fn start_session(&mut self, audio: &mut dyn AudioSink) -> Result<(), GameError> {
        self.timer.cancel();
        let session = SessionState::new(self.start_level, self.max_level)
            .with_incorrect_gate(self.gate_incorrect)
            .with_score_carry(self.carry_score);
        log::info!("Session started at level {}", session.level);
        self.events.push(GameEvent::SessionStarted {
            level: session.level,
        });
        self.session = Some(session);
        if let Err(e) = audio.play_looping_music(MusicTrack::Play) {
            log::warn!("Music unavailable: {e}");
        }
        self.begin_round(audio)
    }

    /// Abandon the session and go back to the title screen
    pub fn leave_session(&mut self, audio: &mut dyn AudioSink) {
        self.timer.cancel();
        self.choices.clear();
        if self.session.take().is_some() {
            log::info!("Session left");
            self.events.push(GameEvent::SessionLeft);
        }
        if let Err(e) = audio.play_looping_music(MusicTrack::Menu) {
            log::warn!("Music unavailable: {e}");
        }
    }

    /// Advance by one frame
    pub fn tick(
        &mut self,
        input: &TickInput,
        audio: &mut dyn AudioSink,
        dt: Duration,
    ) -> Result<(), GameError> {
        // Idle/demo mode - pick like a child would
        let mut input = input.clone();
        if input.idle_mode
            && let Some(pos) = self.demo_pointer(audio)
        {
            input.events.push(InputEvent::PointerDown(pos));
        }

        // A timer armed by this frame's input starts counting next frame
        let counting = self.timer.is_armed();
        for event in &input.events {
            match *event {
                InputEvent::PointerDown(pos) => self.on_pointer(pos, audio)?,
                InputEvent::QuitRequested => {
                    self.quit_requested = true;
                    self.leave_session(audio);
                }
                InputEvent::KeyPressed(key) => self.on_key(key, audio)?,
            }
        }

        if counting && let Some(Pending::NextRound) = self.timer.tick(dt) {
            self.begin_round(audio)?;
        }

        let secs = dt.as_secs_f32();
        if let Some(session) = &mut self.session {
            session.update(secs);
        }
        for choice in &mut self.choices {
            choice.update(secs);
        }
        Ok(())
    }

    fn on_key(&mut self, key: Key, audio: &mut dyn AudioSink) -> Result<(), GameError> {
        match (key, self.session.as_ref().map(|s| s.phase)) {
            (Key::Escape, Some(_)) => self.leave_session(audio),
            (Key::Escape, None) => self.quit_requested = true,
            (Key::Enter | Key::Space, None) => self.start_session(audio)?,
            (Key::Enter | Key::Space, Some(SessionPhase::SequenceComplete)) => {
                self.next_sequence(audio)?
            }
            _ => {}
        }
        Ok(())
    }

    fn on_pointer(&mut self, pos: Vec2, audio: &mut dyn AudioSink) -> Result<(), GameError> {
        let Some(phase) = self.session.as_ref().map(|s| s.phase) else {
            if self.layout.start_button().contains_point(pos) {
                self.start_session(audio)?;
            }
            return Ok(());
        };

        if self.layout.back_button().contains_point(pos) {
            self.leave_session(audio);
            return Ok(());
        }

        match phase {
            SessionPhase::SequenceComplete => {
                if self.layout.next_button().contains_point(pos) {
                    self.next_sequence(audio)?;
                }
            }
            SessionPhase::Active => match self.choices.iter().position(|c| c.hit_test(pos)) {
                Some(index) => self.select(index, audio),
                None => log::debug!("Click at {pos} hit nothing"),
            },
        }
        Ok(())
    }

    /// Offer the choice at `index` as the answer
    fn select(&mut self, index: usize, audio: &mut dyn AudioSink) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let value = self.choices[index].value();
        let busy = audio.is_channel_busy();
        let outcome = session.record_answer(value, &*self.validator, busy);
        log::debug!("Picked {value} for target {}: {outcome:?}", session.target);

        match outcome {
            AnswerOutcome::Correct {
                points,
                sequence_complete,
            } => {
                for (i, choice) in self.choices.iter_mut().enumerate() {
                    if i == index {
                        choice.mark_correct();
                    } else {
                        choice.fade_out();
                    }
                }
                self.events.push(GameEvent::AnswerAccepted { value, points });
                if sequence_complete {
                    self.events.push(GameEvent::SequenceCompleted {
                        score: session.score,
                        next_level: session.level,
                    });
                    play(audio, Cue::YouDidIt);
                } else {
                    play(audio, Cue::Good);
                    if self.timer.arm(Pending::NextRound, self.advance_delay) {
                        log::warn!("Replaced a pending round advance");
                    }
                }
            }
            AnswerOutcome::Incorrect => {
                self.choices[index].mark_incorrect();
                self.events.push(GameEvent::AnswerRejected { value });
                play(audio, Cue::NoGood);
            }
            AnswerOutcome::Suppressed => {
                self.events.push(GameEvent::AnswerSuppressed { value });
            }
            AnswerOutcome::Ignored => {}
        }
    }

    fn next_sequence(&mut self, audio: &mut dyn AudioSink) -> Result<(), GameError> {
        let moved_on = self
            .session
            .as_mut()
            .is_some_and(|session| session.next_sequence());
        if moved_on {
            self.begin_round(audio)?;
        }
        Ok(())
    }

    /// Open the next round: new option set at block starts, prompt cue
    fn begin_round(&mut self, audio: &mut dyn AudioSink) -> Result<(), GameError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let fresh_block = session.advance();
        let (round, target, level) = (session.rounds_played, session.target, session.level);
        let presentation = session.presentation();

        if fresh_block || self.choices.is_empty() {
            let values = self.generator.generate(target, &mut self.rng)?;
            let slots = self.layout.option_slots(values.len());
            self.choices = values
                .iter()
                .zip(slots)
                .map(|(&value, bounds)| {
                    let face =
                        presentation.make_face(value, self.layout.option_size, &mut self.rng);
                    Choice::new(face, bounds)
                })
                .collect();
            log::debug!("Options: {values:?}");
            self.events.push(GameEvent::OptionsGenerated { values });
        } else {
            for choice in &mut self.choices {
                choice.reset();
            }
        }

        self.events.push(GameEvent::RoundStarted {
            round,
            target,
            level,
        });
        play(audio, Cue::prompt(target, presentation));
        Ok(())
    }

    /// Where the demo player clicks this frame, if anywhere.
    ///
    /// Waits for the round to fade in and the channel to go quiet, then on odd
    /// rounds tries one wrong option before the right one.
    fn demo_pointer(&mut self, audio: &dyn AudioSink) -> Option<Vec2> {
        let Some(session) = self.session.as_ref() else {
            return Some(self.layout.start_button().center());
        };
        if audio.is_channel_busy() || self.timer.is_armed() {
            return None;
        }
        if let Some(feedback) = &session.feedback
            && feedback.alpha < 1.0
        {
            return None;
        }
        match session.phase {
            SessionPhase::SequenceComplete => Some(self.layout.next_button().center()),
            SessionPhase::Active if session.answered_correctly || !session.transition_done() => {
                None
            }
            SessionPhase::Active => {
                let target = session.target;
                let wrong: Vec<&Choice> = self
                    .choices
                    .iter()
                    .filter(|c| !c.is_target(target) && c.visual == VisualState::Normal)
                    .collect();
                let try_wrong = session.rounds_played % 2 == 1 && !session.answered_incorrectly;
                let pick = match wrong.choose(&mut self.rng) {
                    Some(choice) if try_wrong => Some(*choice),
                    _ => self.choices.iter().find(|c| c.is_target(target)),
                };
                pick.map(|c| c.bounds.center())
            }
        }
    }
}

/// Play a cue, skipping it if the backend cannot
fn play(audio: &mut dyn AudioSink, cue: Cue) {
    if let Err(e) = audio.play_once(&cue.clip_id()) {
        log::warn!("Skipping cue \"{}\": {e}", cue.phrase());
    }
}
