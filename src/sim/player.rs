//! Player controller
//!
//! Runs first in the tick: movement, aim, shooting, item drop, the decode
//! state machine and finally the interact pulse. Decode advances before the
//! interact pulse is handled, so an interaction that arms the decode this
//! tick only starts counting on the next one.

use glam::Vec2;
use rand::Rng;

use super::geom::within;
use super::input::ResolvedInput;
use super::state::{
    AlertLevel, Bullet, BulletOwner, DecodeState, EnemyTier, GameEvent, ItemKind, MessageKind,
    Session, SoundEffect,
};

/// Run the whole player stage for one tick
pub fn update_player(session: &mut Session, input: &ResolvedInput) {
    move_player(session, input.movement);

    if let Some(aim) = input.aim {
        session.player.aim = aim;
    }
    if input.fire {
        shoot(session);
    }
    if let Some(slot) = input.drop_slot {
        drop_item(session, slot);
    }

    update_decode(session, input);

    if input.interact {
        try_interact(session);
    }
}

/// Move with per-axis collision; speed halves while encumbered
pub fn move_player(session: &mut Session, movement: Vec2) {
    let speed = session.player.effective_speed(&session.tuning);
    let old = session.player.pos;
    let new = session.map.slide(old, movement * speed);
    session.player.pos = new;
    session.player.vel = new - old;
}

/// Fire one bullet if there is ammo and the cooldown has elapsed
pub fn shoot(session: &mut Session) {
    let now = session.time_ticks;
    let cooldown = session.tuning.fire_cooldown_ticks;
    let player = &mut session.player;

    let ready = player
        .last_fire_tick
        .is_none_or(|last| now.saturating_sub(last) >= cooldown);
    if player.ammo == 0 || !ready {
        return;
    }

    player.ammo -= 1;
    player.last_fire_tick = Some(now);

    let recoil = session.tuning.recoil;
    let jitter = if recoil > 0.0 {
        session.rng.random_range(-recoil..recoil)
    } else {
        0.0
    };
    let angle = session.player.aim + jitter;
    session.bullets.push(Bullet {
        pos: session.player.pos,
        vel: crate::from_heading(angle) * session.tuning.bullet_speed,
        owner: BulletOwner::Player,
    });
    session.emit(GameEvent::Sound(SoundEffect::PlayerShot));
}

/// Put the item in `slot` back on the ground near the player
///
/// A slot that no longer exists is ignored.
pub fn drop_item(session: &mut Session, slot: usize) {
    if slot >= session.player.inventory.len() {
        log::debug!("Drop ignored: slot {} is empty", slot);
        return;
    }

    let mut item = session.player.inventory.remove(slot);
    session.player.weight = session.player.weight.saturating_sub(item.weight);

    let scatter = session.tuning.drop_scatter;
    let offset = if scatter > 0.0 {
        Vec2::new(
            session.rng.random_range(-scatter..scatter),
            session.rng.random_range(-scatter..scatter),
        )
    } else {
        Vec2::ZERO
    };
    item.pos = Some(session.player.pos + offset);
    item.bob_phase = session.rng.random_range(0.0..100.0);
    session.loot.push(item);
}

/// Advance the special item decode by one tick
pub fn update_decode(session: &mut Session, input: &ResolvedInput) {
    match session.decode {
        DecodeState::Inactive => {
            // Held-key fallback. A trigger pulse this tick takes precedence
            // and is handled by `try_interact`.
            if input.interact_held && !input.interact && brick_in_reach(session) {
                session.decode = DecodeState::Armed;
            }
        }
        DecodeState::Armed => {
            session.decode = DecodeState::Decoding { ticks: 2 };
        }
        DecodeState::Decoding { ticks } => {
            if session.player.vel != Vec2::ZERO || input.is_moving() {
                session.decode = DecodeState::Inactive;
                session.show_message(MessageKind::DecodeInterrupted);
                return;
            }
            let ticks = ticks + 1;
            if ticks > session.tuning.decode_ticks {
                complete_decode(session);
            } else {
                session.decode = DecodeState::Decoding { ticks };
            }
        }
    }
}

fn brick_in_reach(session: &Session) -> bool {
    let reach = session.tuning.interact_radius;
    session
        .brick_on_ground()
        .and_then(|b| b.pos)
        .is_some_and(|p| within(session.player.pos, p, reach))
}

fn complete_decode(session: &mut Session) {
    session.decode = DecodeState::Inactive;
    session.brick_decoded = true;
    session.alert = AlertLevel::Alerted;
    session.show_message(MessageKind::DecodeComplete);

    if let Some(idx) = session
        .loot
        .iter()
        .position(|i| i.kind == ItemKind::SpecialBrick)
    {
        let brick = session.loot.remove(idx);
        session.player.stash(brick);
    }

    let count = session.tuning.reinforcement_count;
    session.spawn_enemies(count, EnemyTier::Boss);
    session.emit(GameEvent::Sound(SoundEffect::Alarm));
    log::info!(
        "Special item decoded at tick {}: alert raised, {} reinforcements inbound",
        session.time_ticks,
        count
    );
}

/// Pick up (or start decoding) the newest ground item within reach
pub fn try_interact(session: &mut Session) {
    let reach = session.tuning.interact_radius;
    let player_pos = session.player.pos;
    let Some(idx) = session
        .loot
        .iter()
        .rposition(|i| i.pos.is_some_and(|p| within(player_pos, p, reach)))
    else {
        return;
    };

    match session.loot[idx].kind {
        ItemKind::SpecialBrick => {
            if session.decode == DecodeState::Inactive {
                session.decode = DecodeState::Armed;
                log::debug!("Decode armed at tick {}", session.time_ticks);
            }
        }
        ItemKind::Ammo => {
            session.loot.remove(idx);
            let amount = session.tuning.ammo_pickup;
            session.player.add_ammo(amount);
            session.show_message(MessageKind::AmmoPickup);
            session.emit(GameEvent::Sound(SoundEffect::Pickup));
        }
        ItemKind::Medkit => {
            session.loot.remove(idx);
            let amount = session.tuning.medkit_heal;
            session.player.heal(amount);
            session.show_message(MessageKind::MedkitPickup);
            session.emit(GameEvent::Sound(SoundEffect::Pickup));
        }
        ItemKind::Common | ItemKind::Rare | ItemKind::Gold => {
            if session.player.inventory.len() < session.tuning.inventory_slots {
                let item = session.loot.remove(idx);
                session.player.stash(item);
                session.emit(GameEvent::Sound(SoundEffect::Pickup));
            } else {
                session.show_message(MessageKind::InventoryFull);
            }
        }
    }
}
