//! Selectable options and their presentation faces
//!
//! A `Choice` is one clickable candidate. What it looks like depends on the
//! level: a numeral (`DigitFace`) or a group of countable balls (`BallFace`).
//! Faces only describe what to draw (`Mark`s in box-local coordinates); the
//! renderer decides how.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;

/// Visual/interactive state of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisualState {
    #[default]
    Normal,
    /// The correct option after it was picked
    HighlightCorrect,
    /// A wrong pick, briefly
    HighlightIncorrect,
    /// Not picked; dims once the round is won
    FadingOut,
}

/// Presentation variant, one per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Presentation {
    /// Level 1: plain numerals
    Digits,
    /// Level 2: groups of balls to count
    Balls,
    /// Level 3: ball groups captioned with their numeral
    DigitsAndBalls,
}

impl Presentation {
    pub fn for_level(level: u8) -> Self {
        match level {
            1 => Presentation::Digits,
            2 => Presentation::Balls,
            _ => Presentation::DigitsAndBalls,
        }
    }

    /// Text following the number word in the on-screen prompt
    pub fn prompt_tail(&self, target: u32) -> &'static str {
        match self {
            Presentation::Digits => "",
            Presentation::Balls if target == 1 => " ball",
            Presentation::Balls => " balls",
            Presentation::DigitsAndBalls => " number and balls",
        }
    }

    /// Build the face for one option value
    pub fn make_face<R: Rng + ?Sized>(
        &self,
        value: u32,
        box_size: f32,
        rng: &mut R,
    ) -> Box<dyn ChoiceFace> {
        match self {
            Presentation::Digits => Box::new(DigitFace::new(value)),
            Presentation::Balls => Box::new(BallFace::new(value, box_size, false, rng)),
            Presentation::DigitsAndBalls => Box::new(BallFace::new(value, box_size, true, rng)),
        }
    }
}

/// One drawable element of a face, in box-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    Numeral { value: u32, center: Vec2, size: f32 },
    Ball { center: Vec2, radius: f32, palette: u8 },
}

/// What every option variant can do
pub trait ChoiceFace: fmt::Debug {
    /// The quantity this face stands for
    fn value(&self) -> u32;

    /// Whether a screen point selects this face when laid out in `bounds`
    fn hit_test(&self, bounds: &Rect, point: Vec2) -> bool {
        bounds.contains_point(point)
    }

    /// Marks to draw, relative to the top-left of the option box
    fn render_intent(&self) -> Vec<Mark>;

    /// Per-frame animation; `celebrate` is true while highlighted correct
    fn animate(&mut self, _dt: f32, _celebrate: bool) {}
}

/// A numeral in a box
#[derive(Debug, Clone, PartialEq)]
pub struct DigitFace {
    value: u32,
}

impl DigitFace {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

impl ChoiceFace for DigitFace {
    fn value(&self) -> u32 {
        self.value
    }

    fn render_intent(&self) -> Vec<Mark> {
        vec![Mark::Numeral {
            value: self.value,
            center: Vec2::splat(OPTION_SIZE / 2.0),
            size: 120.0,
        }]
    }
}

/// Number of ball palette entries (red, green, blue, yellow, white)
pub const BALL_PALETTE_LEN: u8 = 5;

/// A ball inside a ball group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Center, relative to the box top-left
    pub pos: Vec2,
    /// Drift velocity (px/s), only applied while celebrating
    pub vel: Vec2,
    pub palette: u8,
}

/// `value` balls arranged in a pyramid
#[derive(Debug, Clone, PartialEq)]
pub struct BallFace {
    value: u32,
    box_size: f32,
    caption: bool,
    balls: Vec<Ball>,
}

impl BallFace {
    pub fn new<R: Rng + ?Sized>(value: u32, box_size: f32, caption: bool, rng: &mut R) -> Self {
        let balls = pyramid_layout(value, box_size)
            .into_iter()
            .map(|pos| {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                Ball {
                    pos,
                    vel: Vec2::new(angle.cos(), angle.sin()) * BALL_SPEED,
                    palette: rng.random_range(0..BALL_PALETTE_LEN),
                }
            })
            .collect();
        Self {
            value,
            box_size,
            caption,
            balls,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }
}

impl ChoiceFace for BallFace {
    fn value(&self) -> u32 {
        self.value
    }

    fn render_intent(&self) -> Vec<Mark> {
        let mut marks: Vec<Mark> = self
            .balls
            .iter()
            .map(|b| Mark::Ball {
                center: b.pos,
                radius: BALL_RADIUS,
                palette: b.palette,
            })
            .collect();
        if self.caption {
            marks.push(Mark::Numeral {
                value: self.value,
                center: Vec2::new(self.box_size / 2.0, self.box_size - 24.0),
                size: 40.0,
            });
        }
        marks
    }

    fn animate(&mut self, dt: f32, celebrate: bool) {
        if !celebrate {
            return;
        }
        let lo = BALL_PADDING;
        let hi = self.box_size - BALL_PADDING;
        for ball in &mut self.balls {
            ball.pos += ball.vel * dt;
            if ball.pos.x <= lo || ball.pos.x >= hi {
                ball.vel.x = -ball.vel.x;
                ball.pos.x = ball.pos.x.clamp(lo, hi);
            }
            if ball.pos.y <= lo || ball.pos.y >= hi {
                ball.vel.y = -ball.vel.y;
                ball.pos.y = ball.pos.y.clamp(lo, hi);
            }
        }
    }
}

/// Ball centers for a centered pyramid of `count` balls in a square box.
///
/// Row `r` holds `r + 1` balls (the last row may be short); rows are stacked
/// `BALL_SPACING` apart and the whole pyramid is centered in the box.
pub fn pyramid_layout(count: u32, box_size: f32) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let row_of = |i: u32| (((8 * i + 1) as f32).sqrt() as u32 - 1) / 2;
    let rows = row_of(count - 1) + 1;
    let top = (box_size - rows as f32 * BALL_SPACING) / 2.0 + BALL_SPACING / 2.0;
    let center_x = box_size / 2.0;

    (0..count)
        .map(|i| {
            let r = row_of(i);
            let first = r * (r + 1) / 2;
            let p = i - first;
            let in_row = (r + 1).min(count - first);
            let start_x = center_x - (in_row - 1) as f32 * BALL_SPACING / 2.0;
            Vec2::new(start_x + p as f32 * BALL_SPACING, top + r as f32 * BALL_SPACING)
        })
        .collect()
}

/// One clickable option on screen
#[derive(Debug)]
pub struct Choice {
    pub face: Box<dyn ChoiceFace>,
    /// Screen region that selects this option
    pub bounds: Rect,
    pub visual: VisualState,
    /// Draw opacity (1.0 = opaque), lowered while fading out
    pub opacity: f32,
    /// Seconds left on a wrong-pick highlight
    flash_secs: f32,
}

impl Choice {
    pub fn new(face: Box<dyn ChoiceFace>, bounds: Rect) -> Self {
        Self {
            face,
            bounds,
            visual: VisualState::Normal,
            opacity: 1.0,
            flash_secs: 0.0,
        }
    }

    pub fn value(&self) -> u32 {
        self.face.value()
    }

    pub fn is_target(&self, target: u32) -> bool {
        self.value() == target
    }

    pub fn hit_test(&self, point: Vec2) -> bool {
        self.face.hit_test(&self.bounds, point)
    }

    pub fn render_intent(&self) -> Vec<Mark> {
        self.face.render_intent()
    }

    pub fn mark_correct(&mut self) {
        self.visual = VisualState::HighlightCorrect;
        self.opacity = 1.0;
    }

    pub fn mark_incorrect(&mut self) {
        self.visual = VisualState::HighlightIncorrect;
        self.flash_secs = INCORRECT_FLASH_SECS;
    }

    pub fn fade_out(&mut self) {
        self.visual = VisualState::FadingOut;
    }

    /// Back to a fresh look for the next round in the same block
    pub fn reset(&mut self) {
        self.visual = VisualState::Normal;
        self.opacity = 1.0;
        self.flash_secs = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        match self.visual {
            VisualState::HighlightIncorrect => {
                self.flash_secs -= dt;
                if self.flash_secs <= 0.0 {
                    self.flash_secs = 0.0;
                    self.visual = VisualState::Normal;
                }
            }
            VisualState::FadingOut => {
                self.opacity = (self.opacity - FADE_SPEED * dt).max(FADE_FLOOR);
            }
            _ => {}
        }
        let celebrate = self.visual == VisualState::HighlightCorrect;
        self.face.animate(dt, celebrate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_presentation_by_level() {
        assert_eq!(Presentation::for_level(1), Presentation::Digits);
        assert_eq!(Presentation::for_level(2), Presentation::Balls);
        assert_eq!(Presentation::for_level(3), Presentation::DigitsAndBalls);
    }

    #[test]
    fn test_prompt_tail() {
        assert_eq!(Presentation::Digits.prompt_tail(4), "");
        assert_eq!(Presentation::Balls.prompt_tail(1), " ball");
        assert_eq!(Presentation::Balls.prompt_tail(2), " balls");
        assert_eq!(Presentation::DigitsAndBalls.prompt_tail(7), " number and balls");
    }

    #[test]
    fn test_pyramid_rows() {
        // 1 | 2 | 3 | 4 balls per row for ten
        let pts = pyramid_layout(10, OPTION_SIZE);
        assert_eq!(pts.len(), 10);
        let ys: Vec<f32> = pts.iter().map(|p| p.y).collect();
        assert_eq!(
            ys,
            vec![
                60.0, 120.0, 120.0, 180.0, 180.0, 180.0, 240.0, 240.0, 240.0, 240.0
            ]
        );
        // Apex is centered, bottom row spans symmetric around the center
        assert_eq!(pts[0].x, 150.0);
        assert_eq!(pts[6].x, 60.0);
        assert_eq!(pts[9].x, 240.0);
    }

    #[test]
    fn test_pyramid_short_last_row_is_centered() {
        // Four balls: row 0 has one, row 1 two, row 2 only one
        let pts = pyramid_layout(4, OPTION_SIZE);
        assert_eq!(pts[3].x, 150.0);
        assert!(pyramid_layout(0, OPTION_SIZE).is_empty());
    }

    #[test]
    fn test_ball_face_counts_value() {
        let mut rng = Pcg32::seed_from_u64(1);
        let face = BallFace::new(7, OPTION_SIZE, false, &mut rng);
        assert_eq!(face.value(), 7);
        assert_eq!(face.render_intent().len(), 7);
        assert!(face.balls().iter().all(|b| b.palette < BALL_PALETTE_LEN));

        let captioned = BallFace::new(7, OPTION_SIZE, true, &mut rng);
        assert_eq!(captioned.render_intent().len(), 8);
    }

    #[test]
    fn test_balls_only_move_while_celebrating() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut face = BallFace::new(3, OPTION_SIZE, false, &mut rng);
        let before = face.balls().to_vec();
        face.animate(0.5, false);
        assert_eq!(face.balls(), &before[..]);

        for _ in 0..300 {
            face.animate(1.0 / 30.0, true);
        }
        assert_ne!(face.balls(), &before[..]);
        for b in face.balls() {
            assert!(b.pos.x >= BALL_PADDING && b.pos.x <= OPTION_SIZE - BALL_PADDING);
            assert!(b.pos.y >= BALL_PADDING && b.pos.y <= OPTION_SIZE - BALL_PADDING);
        }
    }

    #[test]
    fn test_incorrect_flash_expires() {
        let mut c = Choice::new(Box::new(DigitFace::new(2)), Rect::new(0.0, 0.0, 300.0, 300.0));
        c.mark_incorrect();
        c.update(0.3);
        assert_eq!(c.visual, VisualState::HighlightIncorrect);
        c.update(0.3);
        assert_eq!(c.visual, VisualState::Normal);
    }

    #[test]
    fn test_fade_out_floors() {
        let mut c = Choice::new(Box::new(DigitFace::new(2)), Rect::new(0.0, 0.0, 300.0, 300.0));
        c.fade_out();
        for _ in 0..30 {
            c.update(0.1);
        }
        assert_eq!(c.opacity, FADE_FLOOR);
        c.reset();
        assert_eq!(c.opacity, 1.0);
        assert_eq!(c.visual, VisualState::Normal);
    }

    #[test]
    fn test_hit_test_uses_bounds() {
        let c = Choice::new(Box::new(DigitFace::new(5)), Rect::new(100.0, 300.0, 300.0, 300.0));
        assert!(c.hit_test(Vec2::new(250.0, 450.0)));
        assert!(!c.hit_test(Vec2::new(50.0, 450.0)));
        assert!(c.is_target(5));
        assert!(!c.is_target(4));
    }
}
