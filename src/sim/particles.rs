//! Cosmetic particle bursts
//!
//! Particles are never read by collision, scoring or AI.

use glam::Vec2;
use rand::Rng;

use super::state::{Particle, Session};

/// Neutral grey sparks (bullet hits a wall)
pub const SPARK_COLOR: u32 = 0xc8c8c8;
/// Red burst (bullet hits a body)
pub const BLOOD_COLOR: u32 = 0xff0000;

/// Maximum live particles
pub const MAX_PARTICLES: usize = 512;

/// Spawn `count` particles at `pos` with random velocity and size
pub fn spawn_burst(session: &mut Session, pos: Vec2, count: u32, color: u32) {
    let life = session.tuning.particle_life;
    for _ in 0..count {
        if session.particles.len() >= MAX_PARTICLES {
            break;
        }
        let vel = Vec2::new(
            session.fx_rng.random_range(-2.0..2.0),
            session.fx_rng.random_range(-2.0..2.0),
        );
        let size = session.fx_rng.random_range(2.0..5.0);
        session.particles.push(Particle {
            pos,
            vel,
            life,
            size,
            color,
        });
    }
}

/// Advance particles and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, decay: f32) {
    for p in particles.iter_mut() {
        p.pos += p.vel;
        p.life -= decay;
    }
    particles.retain(|p| p.life > 0.0);
}
