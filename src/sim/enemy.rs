//! Enemy AI
//!
//! Two states: idle and chase. An enemy starts chasing once the session is
//! alerted or the player comes within detection range, and never goes back.
//! Chasers close in to a standoff distance and fire on a cooldown.

use super::geom::within;
use super::state::{
    AlertLevel, Bullet, BulletOwner, EnemyState, GameEvent, Session, SoundEffect,
};

pub fn update_enemies(session: &mut Session) {
    let t = &session.tuning;
    let (detect, standoff, speed) = (t.detection_radius, t.standoff_distance, t.enemy_speed);
    let (fire_range, cooldown, bullet_speed) = (
        t.enemy_fire_range,
        t.enemy_fire_cooldown_ticks,
        t.enemy_bullet_speed,
    );
    let alerted = session.alert == AlertLevel::Alerted;
    let player_pos = session.player.pos;
    let now = session.time_ticks;

    let mut shots = Vec::new();

    for enemy in &mut session.enemies {
        if enemy.state == EnemyState::Idle && (alerted || within(enemy.pos, player_pos, detect)) {
            enemy.state = EnemyState::Chase;
            log::debug!("Enemy {} engaging at tick {}", enemy.id, now);
        }
        if enemy.state != EnemyState::Chase {
            enemy.vel = glam::Vec2::ZERO;
            continue;
        }

        let to_player = player_pos - enemy.pos;
        let dist = to_player.length();
        let dir = to_player.normalize_or_zero();
        if dir != glam::Vec2::ZERO {
            enemy.facing = crate::heading(dir);
        }

        let old = enemy.pos;
        if dist > standoff {
            enemy.pos = session.map.slide(old, dir * speed);
        }
        enemy.vel = enemy.pos - old;

        if dist < fire_range && now.saturating_sub(enemy.last_shot_tick) >= cooldown {
            enemy.last_shot_tick = now;
            shots.push(Bullet {
                pos: enemy.pos,
                vel: (player_pos - enemy.pos).normalize_or_zero() * bullet_speed,
                owner: BulletOwner::Enemy,
            });
        }
    }

    for shot in shots {
        session.bullets.push(shot);
        session.emit(GameEvent::Sound(SoundEffect::EnemyShot));
    }
}
