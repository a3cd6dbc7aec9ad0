//! Delta Ops - session simulation core for a top-down extraction shooter
//!
//! Core modules:
//! - `sim`: Fixed-timestep session simulation (movement, combat, AI, extraction)
//! - `tuning`: Data-driven game balance and session parameters
//! - `error`: Fail-fast session construction errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::SessionError;
pub use tuning::{Difficulty, PlayerClass, SessionParams, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference tick rate the tick-based timers are tuned for
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep (seconds)
    pub const SIM_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Snapshot cadence (every Nth tick)
    pub const SNAPSHOT_INTERVAL: u64 = 10;
}

/// Angle of a direction vector (radians, atan2 convention)
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector pointing along `angle`
#[inline]
pub fn from_heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
