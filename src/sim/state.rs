//! Session state and round/level transitions
//!
//! `SessionState` is only mutated through its methods, which keep the
//! round counter, target and latches consistent:
//! - `advance` opens the next round
//! - `record_answer` judges a pick and resolves the round
//! - `next_sequence` leaves the end-of-sequence summary

use serde::{Deserialize, Serialize};

use super::choice::Presentation;
use super::validator::{AnswerValidator, Verdict};
use crate::consts::*;
use crate::number_word;

/// Where the session is in its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Rounds are being played
    Active,
    /// All ten rounds done; summary on screen until the player moves on
    SequenceComplete,
}

/// Color family of the feedback box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Negative,
}

/// Feedback banner shown under the options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    pub tone: Tone,
    /// Slide-in progress, 0 → 1
    pub alpha: f32,
}

impl Feedback {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            alpha: 0.0,
        }
    }
}

/// Result of offering a pick to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Scored; `sequence_complete` when this was the last round
    Correct { points: u64, sequence_complete: bool },
    /// Wrong pick, feedback shown; the round stays open
    Incorrect,
    /// Wrong pick dropped because feedback was still playing
    Suppressed,
    /// Round already won, or no round open
    Ignored,
}

/// Score, progress and per-round latches for one play session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    /// Rounds opened in the current sequence, 0..=10
    pub rounds_played: u32,
    /// Value the player is asked to find
    pub target: u32,
    /// Presentation level, 1..=max_level
    pub level: u8,
    pub phase: SessionPhase,
    /// Latched by the first correct pick of the round
    pub answered_correctly: bool,
    /// Set once a wrong pick has been accepted this round
    pub answered_incorrectly: bool,
    pub feedback: Option<Feedback>,
    /// Round fade-in, 0 → 1, restarted every round
    pub transition_progress: f32,
    max_level: u8,
    gate_incorrect: bool,
    carry_score: bool,
}

impl SessionState {
    /// Fresh session; call `advance` to open round 1
    pub fn new(start_level: u8, max_level: u8) -> Self {
        let max_level = max_level.clamp(1, MAX_LEVEL);
        Self {
            score: 0,
            rounds_played: 0,
            target: 1,
            level: start_level.clamp(1, max_level),
            phase: SessionPhase::Active,
            answered_correctly: false,
            answered_incorrectly: false,
            feedback: None,
            transition_progress: 0.0,
            max_level,
            gate_incorrect: true,
            carry_score: false,
        }
    }

    /// Drop wrong picks while the feedback channel is busy (default on)
    pub fn with_incorrect_gate(mut self, enabled: bool) -> Self {
        self.gate_incorrect = enabled;
        self
    }

    /// Keep the score across sequences (default off)
    pub fn with_score_carry(mut self, enabled: bool) -> Self {
        self.carry_score = enabled;
        self
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn presentation(&self) -> Presentation {
        Presentation::for_level(self.level)
    }

    /// Prompt line, e.g. "Point to three balls"
    pub fn prompt_text(&self) -> String {
        let word = number_word(self.target)
            .map(str::to_string)
            .unwrap_or_else(|| self.target.to_string());
        format!(
            "Point to {word}{}",
            self.presentation().prompt_tail(self.target)
        )
    }

    /// Open the next round. Returns true when the round starts a new block and
    /// needs a fresh option set.
    pub fn advance(&mut self) -> bool {
        if !self.is_active() || self.rounds_played >= ROUNDS_PER_SEQUENCE {
            log::warn!(
                "advance() with no round to open (round {}, {:?})",
                self.rounds_played,
                self.phase
            );
            return false;
        }
        self.rounds_played += 1;
        self.target = self.rounds_played;
        self.answered_correctly = false;
        self.answered_incorrectly = false;
        self.feedback = None;
        self.transition_progress = 0.0;
        log::info!(
            "Round {} (level {}): target {}",
            self.rounds_played,
            self.level,
            self.target
        );
        (self.rounds_played - 1) % ROUNDS_PER_BLOCK == 0
    }

    /// Judge a pick against the current target
    pub fn record_answer(
        &mut self,
        selected: u32,
        validator: &dyn AnswerValidator,
        channel_busy: bool,
    ) -> AnswerOutcome {
        if !self.is_active() || self.rounds_played == 0 || self.answered_correctly {
            return AnswerOutcome::Ignored;
        }

        match validator.judge(selected, self.target) {
            Verdict::Correct { points } => {
                self.score += points;
                self.answered_correctly = true;
                self.feedback = Some(Feedback::new(
                    format!("Good! +{points} points"),
                    Tone::Positive,
                ));
                let sequence_complete = self.rounds_played == ROUNDS_PER_SEQUENCE;
                if sequence_complete {
                    self.complete_sequence();
                }
                AnswerOutcome::Correct {
                    points,
                    sequence_complete,
                }
            }
            Verdict::Incorrect if self.gate_incorrect && channel_busy => AnswerOutcome::Suppressed,
            Verdict::Incorrect => {
                self.answered_incorrectly = true;
                self.feedback = Some(Feedback::new("No good!", Tone::Negative));
                AnswerOutcome::Incorrect
            }
        }
    }

    fn complete_sequence(&mut self) {
        let finished = self.level;
        self.phase = SessionPhase::SequenceComplete;
        self.level = self.level % self.max_level + 1;
        self.rounds_played = 0;
        self.feedback = Some(Feedback::new("You did it!", Tone::Positive));
        log::info!(
            "Level {finished} complete with {} points, next level {}",
            self.score,
            self.level
        );
    }

    /// Leave the summary and start the next sequence at round 0. Returns
    /// false if there is no finished sequence to leave.
    pub fn next_sequence(&mut self) -> bool {
        if self.phase != SessionPhase::SequenceComplete {
            return false;
        }
        self.phase = SessionPhase::Active;
        self.rounds_played = 0;
        self.answered_correctly = false;
        self.answered_incorrectly = false;
        self.feedback = None;
        self.transition_progress = 0.0;
        if !self.carry_score {
            self.score = 0;
        }
        true
    }

    /// Feedback slide-in and round fade-in
    pub fn update(&mut self, dt: f32) {
        if let Some(feedback) = &mut self.feedback {
            feedback.alpha = (feedback.alpha + FEEDBACK_SPEED * dt).min(1.0);
        }
        self.transition_progress = (self.transition_progress + TRANSITION_SPEED * dt).min(1.0);
    }

    pub fn transition_done(&self) -> bool {
        self.transition_progress >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::validator::ExactMatch;

    fn started() -> SessionState {
        let mut s = SessionState::new(1, MAX_LEVEL);
        assert!(s.advance());
        s
    }

    /// Win rounds until `round` is open
    fn play_to(s: &mut SessionState, round: u32) {
        let v = ExactMatch::default();
        while s.rounds_played < round {
            let target = s.target;
            s.record_answer(target, &v, false);
            s.advance();
        }
    }

    #[test]
    fn test_first_round() {
        let s = started();
        assert_eq!(s.rounds_played, 1);
        assert_eq!(s.target, 1);
        assert_eq!(s.score, 0);
        assert!(s.is_active());
        assert_eq!(s.prompt_text(), "Point to one");
    }

    #[test]
    fn test_new_block_at_rounds_one_and_six() {
        let mut s = SessionState::new(1, MAX_LEVEL);
        let v = ExactMatch::default();
        let mut fresh = Vec::new();
        for _ in 0..10 {
            if s.advance() {
                fresh.push(s.rounds_played);
            }
            let target = s.target;
            s.record_answer(target, &v, false);
        }
        assert_eq!(fresh, vec![1, 6]);
    }

    #[test]
    fn test_double_correct_scores_once() {
        let mut s = started();
        let v = ExactMatch::default();
        assert_eq!(
            s.record_answer(1, &v, false),
            AnswerOutcome::Correct {
                points: 10,
                sequence_complete: false
            }
        );
        assert_eq!(s.record_answer(1, &v, false), AnswerOutcome::Ignored);
        assert_eq!(s.score, 10);
        assert!(s.answered_correctly);
    }

    #[test]
    fn test_incorrect_keeps_round_open() {
        let mut s = started();
        let v = ExactMatch::default();
        assert_eq!(s.record_answer(3, &v, false), AnswerOutcome::Incorrect);
        assert!(s.answered_incorrectly);
        assert_eq!(s.feedback.as_ref().map(|f| f.tone), Some(Tone::Negative));
        assert_eq!(s.score, 0);

        // Gated while feedback is still sounding
        assert_eq!(s.record_answer(2, &v, true), AnswerOutcome::Suppressed);

        // Correct picks are never gated
        assert!(matches!(
            s.record_answer(1, &v, true),
            AnswerOutcome::Correct { .. }
        ));
    }

    #[test]
    fn test_gate_can_be_disabled() {
        let mut s = SessionState::new(1, MAX_LEVEL).with_incorrect_gate(false);
        s.advance();
        let v = ExactMatch::default();
        assert_eq!(s.record_answer(4, &v, true), AnswerOutcome::Incorrect);
    }

    #[test]
    fn test_sequence_complete() {
        let mut s = started();
        play_to(&mut s, 10);
        assert_eq!(s.target, 10);
        assert_eq!(s.score, 90);

        let v = ExactMatch::default();
        assert_eq!(
            s.record_answer(10, &v, false),
            AnswerOutcome::Correct {
                points: 10,
                sequence_complete: true
            }
        );
        assert!(!s.is_active());
        assert_eq!(s.rounds_played, 0);
        assert_eq!(s.level, 2);
        assert_eq!(s.score, 100);
        assert_eq!(s.feedback.as_ref().unwrap().text, "You did it!");

        // Nothing counts on the summary screen
        assert_eq!(s.record_answer(1, &v, false), AnswerOutcome::Ignored);
        assert!(!s.advance());
        assert_eq!(s.rounds_played, 0);
    }

    #[test]
    fn test_level_wraps() {
        let mut s = SessionState::new(3, 3);
        s.advance();
        play_to(&mut s, 10);
        s.record_answer(10, &ExactMatch::default(), false);
        assert_eq!(s.level, 1);
    }

    #[test]
    fn test_next_sequence_resets_score() {
        let mut s = started();
        assert!(!s.next_sequence());
        play_to(&mut s, 10);
        s.record_answer(10, &ExactMatch::default(), false);

        assert!(s.next_sequence());
        assert!(s.is_active());
        assert_eq!(s.score, 0);
        assert!(s.advance());
        assert_eq!(s.target, 1);
        assert_eq!(s.prompt_text(), "Point to one ball");
    }

    #[test]
    fn test_score_carry() {
        let mut s = SessionState::new(1, MAX_LEVEL).with_score_carry(true);
        s.advance();
        play_to(&mut s, 10);
        s.record_answer(10, &ExactMatch::default(), false);
        s.next_sequence();
        assert_eq!(s.score, 100);
    }

    #[test]
    fn test_animation_scalars() {
        let mut s = started();
        s.record_answer(1, &ExactMatch::default(), false);
        s.update(0.1);
        assert!((s.feedback.as_ref().unwrap().alpha - 0.5).abs() < 1e-5);
        assert!((s.transition_progress - 0.2).abs() < 1e-5);
        s.update(1.0);
        assert_eq!(s.feedback.as_ref().unwrap().alpha, 1.0);
        assert!(s.transition_done());

        s.advance();
        assert_eq!(s.transition_progress, 0.0);
        assert!(s.feedback.is_none());
    }

    #[test]
    fn test_rounds_played_stays_in_range() {
        let mut s = started();
        let v = ExactMatch::default();
        for _ in 0..35 {
            if s.is_active() {
                let target = s.target;
                s.record_answer(target, &v, false);
                s.advance();
            } else {
                s.next_sequence();
                s.advance();
            }
            assert!(s.rounds_played <= ROUNDS_PER_SEQUENCE);
            assert!((1..=MAX_LEVEL).contains(&s.level));
        }
    }
}
