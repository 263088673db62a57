//! Axis-aligned screen rectangles
//!
//! Every clickable thing (option boxes, buttons) is a `Rect` in logical
//! screen pixels, origin top-left, y pointing down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            min: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Check if a point is inside (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x <= max.x && point.y >= self.min.y && point.y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_edges_inclusive() {
        let r = Rect::new(100.0, 300.0, 300.0, 300.0);
        assert!(r.contains_point(Vec2::new(100.0, 300.0)));
        assert!(r.contains_point(Vec2::new(400.0, 600.0)));
        assert!(r.contains_point(r.center()));
        assert!(!r.contains_point(Vec2::new(99.0, 450.0)));
        assert!(!r.contains_point(Vec2::new(250.0, 601.0)));
    }

    #[test]
    fn test_from_center() {
        let r = Rect::from_center(Vec2::new(960.0, 700.0), Vec2::new(400.0, 120.0));
        assert_eq!(r.min, Vec2::new(760.0, 640.0));
        assert_eq!(r.center(), Vec2::new(960.0, 700.0));
        assert_eq!(r.max(), Vec2::new(1160.0, 760.0));
    }
}
