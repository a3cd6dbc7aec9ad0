//! Projectile advancement and damage resolution
//!
//! Each bullet moves by its velocity once per tick, then is tested in order
//! against obstacles, its target(s) and the range limit. The first test
//! that removes it wins, so a bullet resolves at most one hit per tick.

use glam::Vec2;
use rand::Rng;

use super::extraction::finish_session;
use super::geom::within;
use super::particles::{BLOOD_COLOR, SPARK_COLOR, spawn_burst};
use super::state::{Bullet, BulletOwner, GameEvent, ItemKind, Session, SoundEffect};

const WALL_BURST: u32 = 5;
const HIT_BURST: u32 = 10;

/// Advance every bullet and resolve collisions
pub fn update_bullets(session: &mut Session) {
    let mut bullets = std::mem::take(&mut session.bullets);
    bullets.retain_mut(|bullet| step_bullet(session, bullet));
    // Anything spawned while resolving goes after the survivors
    bullets.append(&mut session.bullets);
    session.bullets = bullets;
}

/// Returns false when the bullet should be removed
fn step_bullet(session: &mut Session, bullet: &mut Bullet) -> bool {
    if session.is_over() {
        return true;
    }

    bullet.pos += bullet.vel;

    if session.map.is_blocked(bullet.pos) {
        spawn_burst(session, bullet.pos, WALL_BURST, SPARK_COLOR);
        return false;
    }

    match bullet.owner {
        BulletOwner::Player => {
            let hit_radius = session.tuning.enemy_hit_radius;
            if let Some(idx) = session
                .enemies
                .iter()
                .rposition(|e| within(bullet.pos, e.pos, hit_radius))
            {
                hit_enemy(session, idx, bullet.pos);
                return false;
            }
        }
        BulletOwner::Enemy => {
            let hit_radius = session.tuning.player_hit_radius;
            if within(bullet.pos, session.player.pos, hit_radius) {
                hit_player(session, bullet.pos);
                return false;
            }
        }
    }

    bullet.pos.distance(session.player.pos) <= session.tuning.bullet_range
}

/// Damage enemy `idx`; remove it (maybe dropping loot) when it dies
fn hit_enemy(session: &mut Session, idx: usize, at: Vec2) {
    let damage = session.tuning.player_bullet_damage;
    session.enemies[idx].health -= damage;
    spawn_burst(session, at, HIT_BURST, BLOOD_COLOR);
    session.emit(GameEvent::Sound(SoundEffect::Hit));

    if session.enemies[idx].health <= 0.0 {
        let enemy = session.enemies.remove(idx);
        log::debug!("Enemy {} ({:?}) killed", enemy.id, enemy.tier);
        let chance = session.tuning.loot_drop_chance;
        if session.rng.random_bool(chance) {
            let item = session.create_item(ItemKind::Common, enemy.pos);
            session.loot.push(item);
        }
    }
}

fn hit_player(session: &mut Session, at: Vec2) {
    let damage = session.tuning.enemy_bullet_damage;
    spawn_burst(session, at, HIT_BURST, BLOOD_COLOR);
    if session.player.take_damage(damage) {
        finish_session(session, false);
    }
}
