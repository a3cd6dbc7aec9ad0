//! Collision queries against the static map
//!
//! The map is a closed rectangle [0, width] × [0, height] plus a set of
//! obstacle rectangles. Movers resolve each axis independently so they can
//! slide along a wall when only one axis is blocked.

use glam::Vec2;

use super::geom::Rect;

/// True if `p` is outside the map or inside any obstacle
pub fn point_blocked(p: Vec2, map_size: Vec2, obstacles: &[Rect]) -> bool {
    if p.x < 0.0 || p.x > map_size.x || p.y < 0.0 || p.y > map_size.y {
        return true;
    }
    obstacles.iter().any(|o| o.contains(p))
}

/// Apply `delta` to `pos`, testing the X and Y candidates separately
///
/// Returns the resolved position. A blocked axis keeps its old coordinate.
pub fn slide_move(pos: Vec2, delta: Vec2, map_size: Vec2, obstacles: &[Rect]) -> Vec2 {
    let mut out = pos;

    let next_x = Vec2::new(out.x + delta.x, out.y);
    if !point_blocked(next_x, map_size, obstacles) {
        out.x = next_x.x;
    }

    let next_y = Vec2::new(out.x, out.y + delta.y);
    if !point_blocked(next_y, map_size, obstacles) {
        out.y = next_y.y;
    }

    out
}
