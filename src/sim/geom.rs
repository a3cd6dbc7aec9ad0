//! Axis-aligned rectangle geometry
//!
//! Obstacles are plain AABBs; every collision query in the simulation is a
//! point-vs-rectangle or point-vs-point distance test.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict interior test: points on the boundary are outside
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x > self.pos.x && p.x < max.x && p.y > self.pos.y && p.y < max.y
    }
}

/// True if `a` and `b` are strictly closer than `radius`
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}
