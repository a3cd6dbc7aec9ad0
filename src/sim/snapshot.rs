//! Read-only state bundles for the presentation layer
//!
//! Snapshots are emitted every [`SNAPSHOT_INTERVAL`] ticks and once more
//! when the session ends. They own their data, so the HUD can keep them
//! around after the session moves on.

use glam::Vec2;
use serde::Serialize;

use super::state::{AlertLevel, DecodeState, GameEvent, Item, MessageKind, Outcome, Session};
use crate::consts::SNAPSHOT_INTERVAL;

/// Player numbers shown on the HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub health: f32,
    pub max_health: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub speed: f32,
    pub weight: u32,
    pub weight_budget: u32,
    pub score: u64,
}

/// Current status message and its cause
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub kind: MessageKind,
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimapSnapshot {
    pub player: Vec2,
    pub enemies: Vec<Vec2>,
    /// Active extraction points only
    pub extraction: Vec<Vec2>,
    /// Special item position while it is still on the ground
    pub special_item: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub player: PlayerStats,
    pub inventory: Vec<Item>,
    pub message: Option<StatusSnapshot>,
    /// Accumulated extraction time (ms)
    pub extraction_ms: f32,
    /// Decode progress bar (0..=1)
    pub decode_progress: f32,
    pub alert: AlertLevel,
    pub outcome: Outcome,
    pub minimap: MinimapSnapshot,
}

impl PlayerStats {
    pub fn capture(session: &Session) -> Self {
        let p = &session.player;
        Self {
            health: p.health,
            max_health: p.max_health,
            ammo: p.ammo,
            max_ammo: p.max_ammo,
            speed: p.base_speed,
            weight: p.weight,
            weight_budget: p.weight_budget,
            score: p.score,
        }
    }
}

impl Snapshot {
    pub fn capture(session: &Session) -> Self {
        let decode_progress = match session.decode {
            DecodeState::Inactive => 0.0,
            state => (state.timer() as f32 / session.tuning.decode_ticks as f32).min(1.0),
        };

        Self {
            tick: session.time_ticks,
            player: PlayerStats::capture(session),
            inventory: session.player.inventory.clone(),
            message: session.message.map(|m| StatusSnapshot {
                kind: m.kind,
                text: m.kind.text(),
            }),
            extraction_ms: session.extraction_ms,
            decode_progress,
            alert: session.alert,
            outcome: session.outcome,
            minimap: MinimapSnapshot {
                player: session.player.pos,
                enemies: session.enemies.iter().map(|e| e.pos).collect(),
                extraction: session
                    .extraction_points
                    .iter()
                    .filter(|ep| ep.active)
                    .map(|ep| ep.pos)
                    .collect(),
                special_item: session.brick_on_ground().and_then(|b| b.pos),
            },
        }
    }
}

/// Emit a snapshot if this tick is on the reporting cadence
pub fn emit_periodic(session: &mut Session) {
    if session.time_ticks % SNAPSHOT_INTERVAL == 0 {
        emit_now(session);
    }
}

pub fn emit_now(session: &mut Session) {
    let snapshot = Snapshot::capture(session);
    session.emit(GameEvent::Snapshot(Box::new(snapshot)));
}
