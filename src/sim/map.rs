//! Procedural map generation
//!
//! A map is a wall ring hugging the play area plus randomly placed interior
//! obstacles. Candidates whose top-left corner falls inside the central
//! exclusion radius are rejected, which keeps the middle of the map open.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{point_blocked, slide_move};
use super::geom::Rect;
use crate::tuning::Tuning;

/// Static map geometry for one session
#[derive(Debug, Clone)]
pub struct MapLayout {
    pub size: Vec2,
    /// Boundary walls first, then interior obstacles
    pub obstacles: Vec<Rect>,
}

impl MapLayout {
    /// Generate walls and interior obstacles from the given RNG
    pub fn generate(tuning: &Tuning, rng: &mut Pcg32) -> Self {
        let w = tuning.map_width;
        let h = tuning.map_height;
        let t = tuning.wall_thickness;

        let mut obstacles = vec![
            Rect::new(-t, -t, w + 2.0 * t, t),
            Rect::new(-t, h, w + 2.0 * t, t),
            Rect::new(-t, 0.0, t, h),
            Rect::new(w, 0.0, t, h),
        ];

        let center = Vec2::new(w / 2.0, h / 2.0);
        let margin = tuning.obstacle_margin;
        let mut rejected = 0u32;

        for _ in 0..tuning.obstacle_candidates {
            let ow = rng.random_range(tuning.obstacle_min_size..=tuning.obstacle_max_size);
            let oh = rng.random_range(tuning.obstacle_min_size..=tuning.obstacle_max_size);
            let x = rng.random_range(margin..=(w - ow - margin));
            let y = rng.random_range(margin..=(h - oh - margin));

            if Vec2::new(x, y).distance(center) > tuning.center_exclusion_radius {
                obstacles.push(Rect::new(x, y, ow, oh));
            } else {
                rejected += 1;
            }
        }

        log::debug!(
            "Generated map {}x{}: {} obstacles ({} candidates rejected near center)",
            w,
            h,
            obstacles.len(),
            rejected
        );

        Self {
            size: Vec2::new(w, h),
            obstacles,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn is_blocked(&self, p: Vec2) -> bool {
        point_blocked(p, self.size, &self.obstacles)
    }

    #[inline]
    pub fn slide(&self, pos: Vec2, delta: Vec2) -> Vec2 {
        slide_move(pos, delta, self.size, &self.obstacles)
    }

    /// Interior obstacles only (the boundary walls are the first four)
    pub fn interior(&self) -> &[Rect] {
        &self.obstacles[4.min(self.obstacles.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn layout(seed: u64) -> MapLayout {
        let mut rng = Pcg32::seed_from_u64(seed);
        MapLayout::generate(&Tuning::default(), &mut rng)
    }

    #[test]
    fn test_wall_ring_encloses_map() {
        let map = layout(1);
        assert!(map.obstacles.len() >= 4);
        // Just outside each edge is wall
        assert!(map.obstacles[0].contains(Vec2::new(1500.0, -10.0)));
        assert!(map.obstacles[1].contains(Vec2::new(1500.0, 3010.0)));
        assert!(map.obstacles[2].contains(Vec2::new(-10.0, 1500.0)));
        assert!(map.obstacles[3].contains(Vec2::new(3010.0, 1500.0)));
    }

    #[test]
    fn test_interior_obstacles_respect_exclusion_radius() {
        let tuning = Tuning::default();
        for seed in 0..20 {
            let map = layout(seed);
            let center = map.center();
            for o in map.interior() {
                assert!(o.pos.distance(center) > tuning.center_exclusion_radius);
                assert!(o.pos.x >= tuning.obstacle_margin);
                assert!(o.max().x <= tuning.map_width - tuning.obstacle_margin + 0.01);
            }
            assert!(!map.is_blocked(center), "map center must stay open");
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = layout(42);
        let b = layout(42);
        assert_eq!(a.obstacles, b.obstacles);
        let c = layout(43);
        assert_ne!(a.obstacles, c.obstacles);
    }
}
