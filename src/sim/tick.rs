//! Fixed timestep simulation tick
//!
//! Stage order is fixed: input resolution, player, bullets, enemies,
//! particles, extraction, snapshot. Later stages see earlier mutations from
//! the same tick, so a bullet fired by the player stage already gets its
//! first advance in the bullet stage.

use super::combat::update_bullets;
use super::enemy::update_enemies;
use super::extraction::update_extraction;
use super::input::resolve;
use super::particles::update_particles;
use super::player::update_player;
use super::snapshot::emit_periodic;
use super::state::{GameEvent, Session};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Advance the session by one tick of `dt` seconds
///
/// Returns the events produced during the tick. A finished session does
/// not advance; it only discards pending one-shot input.
pub fn tick(session: &mut Session, dt: f32) -> Vec<GameEvent> {
    if session.is_over() {
        session.input.clear_one_shots();
        return std::mem::take(&mut session.events);
    }

    session.time_ticks += 1;
    tick_message(session);

    let input = resolve(&session.input, session.player.pos, session.tuning.aim_deadzone);
    session.input.clear_one_shots();

    update_player(session, &input);
    update_bullets(session);
    if !session.is_over() {
        update_enemies(session);
    }
    let decay = session.tuning.particle_decay;
    update_particles(&mut session.particles, decay);
    if !session.is_over() {
        update_extraction(session, dt * 1000.0);
    }
    if !session.is_over() {
        emit_periodic(session);
    }

    std::mem::take(&mut session.events)
}

/// Fixed timestep accumulator for hosts that tick once per display frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    /// Longest frame the clock will try to catch up on (seconds)
    const MAX_FRAME: f32 = 0.1;

    /// Run as many whole ticks as `frame_dt` seconds cover, capped at
    /// [`MAX_SUBSTEPS`](crate::consts::MAX_SUBSTEPS) to prevent a spiral of death
    pub fn advance(&mut self, session: &mut Session, frame_dt: f32) -> Vec<GameEvent> {
        self.accumulator += frame_dt.clamp(0.0, Self::MAX_FRAME);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(tick(session, SIM_DT));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog rather than carrying it into the next frame
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        events
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

fn tick_message(session: &mut Session) {
    if let Some(msg) = session.message.as_mut() {
        msg.ticks_left = msg.ticks_left.saturating_sub(1);
        if msg.ticks_left == 0 {
            session.message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{InputEvent, MoveKeys, TickInput};
    use crate::sim::snapshot::Snapshot;
    use crate::sim::state::{
        AlertLevel, BulletOwner, DecodeState, EnemyTier, ItemKind, MessageKind, Outcome,
    };
    use crate::tuning::{Difficulty, PlayerClass, SessionParams};
    use glam::Vec2;
    use proptest::prelude::*;

    fn params(seed: u64) -> SessionParams {
        SessionParams {
            class: PlayerClass::Recon,
            difficulty: Difficulty::Normal,
            seed,
        }
    }

    /// Open arena, no enemies, player standing next to the brick
    fn quiet_session() -> Session {
        let mut session = Session::with_defaults(params(77));
        session.map.obstacles.truncate(4);
        session.enemies.clear();
        session.loot.retain(|i| i.kind == ItemKind::SpecialBrick);
        session.player.pos = session.map.center() + Vec2::new(10.0, 0.0);
        session
    }

    fn run(session: &mut Session, ticks: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(tick(session, SIM_DT));
        }
        events
    }

    #[test]
    fn test_determinism() {
        let mut a = Session::with_defaults(params(99999));
        let mut b = Session::with_defaults(params(99999));
        let inputs = [
            InputEvent::Keys(MoveKeys {
                right: true,
                ..Default::default()
            }),
            InputEvent::Pointer(Some(Vec2::new(0.0, 0.0))),
            InputEvent::MouseFire(true),
        ];
        for event in inputs {
            a.handle_input(event);
            b.handle_input(event);
        }
        run(&mut a, 120);
        run(&mut b, 120);

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.bullets.len(), b.bullets.len());
        assert_eq!(Snapshot::capture(&a), Snapshot::capture(&b));
    }

    #[test]
    fn test_fresh_bullet_advances_same_tick() {
        let mut session = quiet_session();
        let start = session.player.pos;
        session.handle_input(InputEvent::Pointer(Some(start + Vec2::new(500.0, 0.0))));
        session.handle_input(InputEvent::MouseFire(true));
        let events = tick(&mut session, SIM_DT);

        assert_eq!(session.bullets.len(), 1);
        assert_eq!(session.bullets[0].owner, BulletOwner::Player);
        let travelled = session.bullets[0].pos.distance(start);
        assert!((travelled - 15.0).abs() < 1e-3);
        assert!(events.contains(&GameEvent::Sound(crate::sim::SoundEffect::PlayerShot)));
    }

    #[test]
    fn test_one_shot_interact_consumed() {
        let mut session = quiet_session();
        let pos = session.player.pos;
        let item = session.create_item(ItemKind::Common, pos);
        session.loot.push(item);
        let item = session.create_item(ItemKind::Common, pos);
        session.loot.push(item);

        session.handle_input(InputEvent::Interact);
        run(&mut session, 5);
        assert_eq!(session.player.inventory.len(), 1, "pulse fired exactly once");
        assert!(!session.input.interact);
    }

    #[test]
    fn test_drop_command_consumed_and_stale_index_ignored() {
        let mut session = quiet_session();
        let pos = session.player.pos;
        let item = session.create_item(ItemKind::Gold, pos + Vec2::new(0.0, 20.0));
        session.loot.push(item);
        session.handle_input(InputEvent::Interact);
        tick(&mut session, SIM_DT);
        assert_eq!(session.player.weight, 8);

        session.handle_input(InputEvent::Drop(0));
        tick(&mut session, SIM_DT);
        assert_eq!(session.player.weight, 0);
        assert_eq!(session.input.drop_slot, None);

        session.handle_input(InputEvent::Drop(0));
        tick(&mut session, SIM_DT);
        assert_eq!(session.player.inventory.len(), 0);
    }

    #[test]
    fn test_decode_via_tick_completes() {
        let mut session = quiet_session();
        session.handle_input(InputEvent::Interact);
        tick(&mut session, SIM_DT);
        assert_eq!(session.decode, DecodeState::Armed);

        run(&mut session, 179);
        assert!(matches!(session.decode, DecodeState::Decoding { .. }));
        assert!(!session.brick_decoded);

        let events = run(&mut session, 1);
        assert_eq!(session.decode, DecodeState::Inactive);
        assert!(session.brick_decoded);
        assert_eq!(session.alert, AlertLevel::Alerted);
        assert_eq!(
            session.enemies.iter().filter(|e| e.tier == EnemyTier::Boss).count(),
            5
        );
        assert!(events.contains(&GameEvent::Sound(crate::sim::SoundEffect::Alarm)));
        assert_eq!(session.message.unwrap().kind, MessageKind::DecodeComplete);

        // Alert never drops back
        run(&mut session, 30);
        assert_eq!(session.alert, AlertLevel::Alerted);
    }

    #[test]
    fn test_decode_interrupted_via_tick() {
        let mut session = quiet_session();
        session.handle_input(InputEvent::Interact);
        run(&mut session, 60);
        assert!(matches!(session.decode, DecodeState::Decoding { .. }));

        session.handle_input(InputEvent::Joystick(Vec2::new(0.0, 0.5)));
        tick(&mut session, SIM_DT);
        assert_eq!(session.decode.timer(), 0);
        assert!(session.player.inventory.is_empty());
        assert!(session.brick_on_ground().is_some());
        assert_eq!(session.alert, AlertLevel::Stealth);
    }

    #[test]
    fn test_message_expires() {
        let mut session = quiet_session();
        session.show_message(MessageKind::AmmoPickup);
        run(&mut session, 119);
        assert!(session.message.is_some());
        run(&mut session, 1);
        assert!(session.message.is_none());
    }

    #[test]
    fn test_snapshot_every_tenth_tick() {
        let mut session = quiet_session();
        let events = run(&mut session, 30);
        let snaps: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Snapshot(s) => Some(s.tick),
                _ => None,
            })
            .collect();
        assert_eq!(snaps, vec![10, 20, 30]);
    }

    #[test]
    fn test_extraction_end_freezes_session() {
        let mut session = quiet_session();
        let spot = session.extraction_points[0].pos;
        session.player.pos = spot;
        session.player.health = 80.0;

        let events = run(&mut session, 200);
        assert_eq!(session.outcome, Outcome::Extracted);
        let ended = events
            .iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded { extracted: true, .. }))
            .count();
        assert_eq!(ended, 1);
        assert_eq!(session.player.score, 800);

        let frozen_at = session.time_ticks;
        session.handle_input(InputEvent::Interact);
        let events = run(&mut session, 10);
        assert_eq!(session.time_ticks, frozen_at);
        assert!(events.is_empty());
        assert!(!session.input.interact);
    }

    #[test]
    fn test_reset_idempotence() {
        let mut session = Session::with_defaults(params(5));
        session.handle_input(InputEvent::MouseFire(true));
        run(&mut session, 50);

        session.reset();
        let first = Snapshot::capture(&session);
        let first_map = session.map.obstacles.clone();
        session.reset();
        assert_eq!(Snapshot::capture(&session), first);
        assert_eq!(session.map.obstacles, first_map);
        assert_eq!(session.time_ticks, 0);
        assert!(session.bullets.is_empty());

        session.reset_with_seed(6);
        assert_ne!(session.map.obstacles, first_map);
    }

    #[test]
    fn test_reset_clears_pending_input() {
        let mut session = Session::with_defaults(params(5));
        session.handle_input(InputEvent::Interact);
        session.handle_input(InputEvent::Drop(2));
        session.handle_input(InputEvent::ButtonFire(true));
        session.reset();
        assert_eq!(session.input, TickInput::default());
    }

    #[test]
    fn test_frame_clock_substeps() {
        let mut session = quiet_session();
        let mut clock = FrameClock::default();

        clock.advance(&mut session, SIM_DT * 0.5);
        assert_eq!(session.time_ticks, 0);
        clock.advance(&mut session, SIM_DT * 0.6);
        assert_eq!(session.time_ticks, 1);

        // A long stall is capped
        clock.advance(&mut session, 5.0);
        assert_eq!(session.time_ticks, 1 + MAX_SUBSTEPS as u64);

        clock.reset();
        clock.advance(&mut session, SIM_DT * 0.5);
        assert_eq!(session.time_ticks, 1 + MAX_SUBSTEPS as u64);
    }

    fn arb_input() -> impl Strategy<Value = (u8, bool, bool, f32, f32, f32)> {
        (
            any::<u8>(),
            any::<bool>(),
            prop::bool::weighted(0.05),
            -1.0f32..1.0,
            -1.0f32..1.0,
            -3.2f32..3.2,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_containment_and_bounds(
            seed in any::<u64>(),
            inputs in prop::collection::vec(arb_input(), 1..150),
        ) {
            let mut session = Session::with_defaults(SessionParams { seed, ..params(0) });
            for (bits, fire, interact, jx, jy, aim) in inputs {
                session.handle_input(InputEvent::Keys(MoveKeys {
                    up: bits & 1 != 0,
                    down: bits & 2 != 0,
                    left: bits & 4 != 0,
                    right: bits & 8 != 0,
                }));
                let stick = if bits & 16 != 0 { Vec2::new(jx, jy) } else { Vec2::ZERO };
                session.handle_input(InputEvent::Joystick(stick));
                session.handle_input(InputEvent::AimStick(crate::from_heading(aim)));
                session.handle_input(InputEvent::MouseFire(fire));
                if interact {
                    session.handle_input(InputEvent::Interact);
                }
                tick(&mut session, SIM_DT);

                let p = &session.player;
                prop_assert!(!session.map.is_blocked(p.pos));
                prop_assert!(p.health >= 0.0 && p.health <= p.max_health);
                prop_assert!(p.ammo <= p.max_ammo);
                for e in &session.enemies {
                    prop_assert!(!session.map.is_blocked(e.pos));
                }
                prop_assert!(session.extraction_ms >= 0.0);
            }
        }
    }
}
