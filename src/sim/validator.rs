//! Answer judging
//!
//! Kept apart from sequencing so the scoring rule can change without
//! touching round/level transitions.

/// Outcome of judging one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct { points: u64 },
    Incorrect,
}

/// Decides whether a selection is right and what it is worth
pub trait AnswerValidator {
    fn judge(&self, selected: u32, target: u32) -> Verdict;
}

/// Exact value match for a fixed reward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactMatch {
    pub reward: u64,
}

impl Default for ExactMatch {
    fn default() -> Self {
        Self {
            reward: crate::consts::CORRECT_REWARD,
        }
    }
}

impl AnswerValidator for ExactMatch {
    fn judge(&self, selected: u32, target: u32) -> Verdict {
        if selected == target {
            Verdict::Correct {
                points: self.reward,
            }
        } else {
            Verdict::Incorrect
        }
    }
}
