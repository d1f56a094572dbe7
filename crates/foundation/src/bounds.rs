use serde::Serialize;

use crate::math::Vec2;

/// Axis-aligned box in screen pixels.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Box with its top-left corner at `origin`.
    pub fn from_origin_size(origin: Vec2, size: [f64; 2]) -> Self {
        Aabb2::new([origin.x, origin.y], [origin.x + size[0], origin.y + size[1]])
    }

    pub fn expanded(&self, margin: f64) -> Self {
        Aabb2::new(
            [self.min[0] - margin, self.min[1] - margin],
            [self.max[0] + margin, self.max[1] + margin],
        )
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min[0] < other.max[0]
            && other.min[0] < self.max[0]
            && self.min[1] < other.max[1]
            && other.min[1] < self.max[1]
    }

    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
    }
}
