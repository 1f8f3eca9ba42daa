use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in arena coordinates. `(x, y)` is the top-left
/// corner and y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Inclusive horizontal overlap: touching edges count.
    pub fn overlaps_horizontally(&self, other: &Bounds) -> bool {
        self.right() >= other.left() && self.left() <= other.right()
    }
}
