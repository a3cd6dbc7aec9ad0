//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (gameplay and cosmetic streams kept apart)
//! - Stable iteration order (insertion order of each entity list)
//! - No rendering, audio or platform dependencies; those consume [`GameEvent`]s

pub mod collision;
pub mod combat;
pub mod enemy;
pub mod extraction;
pub mod geom;
pub mod input;
pub mod map;
pub mod particles;
pub mod player;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use extraction::ExtractionPhase;
pub use geom::Rect;
pub use input::{InputEvent, MoveKeys, ResolvedInput, TickInput};
pub use map::MapLayout;
pub use snapshot::{MinimapSnapshot, PlayerStats, Snapshot, StatusSnapshot};
pub use state::{
    AlertLevel, Bullet, BulletOwner, DecodeState, Enemy, EnemyState, EnemyTier, ExtractionPoint,
    GameEvent, Item, ItemKind, MessageKind, Outcome, Particle, Player, Session, SoundEffect,
    StatusMessage,
};
pub use tick::{FrameClock, tick};
