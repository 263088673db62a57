//! Screen geometry
//!
//! Where options and buttons sit on the logical screen. Both hit-testing and
//! drawing read from here so they can never disagree.

use glam::Vec2;

use super::rect::Rect;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub screen: Vec2,
    pub option_size: f32,
    pub option_gap: f32,
    pub row_y: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl Layout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            screen: Vec2::new(width, height),
            option_size: OPTION_SIZE,
            option_gap: OPTION_GAP,
            row_y: OPTION_ROW_Y,
        }
    }

    /// `count` square slots in one horizontally centered row
    pub fn option_slots(&self, count: usize) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let row_width = count as f32 * self.option_size + (count - 1) as f32 * self.option_gap;
        let start_x = (self.screen.x - row_width) / 2.0;
        (0..count)
            .map(|i| {
                Rect::new(
                    start_x + i as f32 * (self.option_size + self.option_gap),
                    self.row_y,
                    self.option_size,
                    self.option_size,
                )
            })
            .collect()
    }

    /// Top-right corner
    pub fn back_button(&self) -> Rect {
        Rect::new(self.screen.x - 230.0, 30.0, 200.0, 80.0)
    }

    /// Under the final score on the summary screen
    pub fn next_button(&self) -> Rect {
        Rect::from_center(
            Vec2::new(self.screen.x / 2.0, self.screen.y * 0.7),
            Vec2::new(360.0, 100.0),
        )
    }

    /// Centered on the title screen
    pub fn start_button(&self) -> Rect {
        Rect::from_center(self.screen / 2.0, Vec2::new(400.0, 120.0))
    }

    /// Baseline of the prompt text
    pub fn prompt_y(&self) -> f32 {
        self.row_y / 2.0
    }

    /// Center of the feedback banner
    pub fn feedback_center(&self) -> Vec2 {
        Vec2::new(self.screen.x / 2.0, self.row_y + self.option_size + 150.0)
    }

    /// Score line, top left
    pub fn score_pos(&self) -> Vec2 {
        Vec2::new(40.0, 70.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_centered() {
        let layout = Layout::default();
        let slots = layout.option_slots(5);
        assert_eq!(slots.len(), 5);
        // 5 × 300 + 4 × 50 = 1700 wide on a 1920 screen
        assert_eq!(slots[0].min, Vec2::new(110.0, 300.0));
        assert_eq!(slots[4].max(), Vec2::new(1810.0, 600.0));
        for pair in slots.windows(2) {
            assert_eq!(pair[1].min.x - pair[0].max().x, 50.0);
        }
    }

    #[test]
    fn test_slots_do_not_overlap_buttons() {
        let layout = Layout::default();
        let back = layout.back_button();
        for slot in layout.option_slots(5) {
            assert!(!slot.contains_point(back.center()));
        }
        assert!(layout.option_slots(0).is_empty());
    }
}
