//! Delta Ops headless driver
//!
//! Runs one session with a simple autopilot and logs what happens.
//! Usage: `delta-ops [class] [difficulty] [seed]`

use delta_ops::consts::{SIM_DT, TICK_RATE};
use delta_ops::sim::{EnemyState, FrameClock, GameEvent, InputEvent, Session};
use delta_ops::{SessionError, SessionParams, Tuning};
use glam::Vec2;

/// Give up after five minutes of simulated time
const TICK_CAP: u64 = TICK_RATE as u64 * 60 * 5;

fn parse_args() -> Result<SessionParams, SessionError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let class = args.first().map(String::as_str).unwrap_or("assault");
    let difficulty = args.get(1).map(String::as_str).unwrap_or("normal");
    let seed = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(42);
    SessionParams::parse(class, difficulty, seed)
}

/// Walk to the nearest extraction point, shoot the nearest chaser
fn autopilot(session: &mut Session) {
    let pos = session.player.pos;

    let goal = session
        .extraction_points
        .iter()
        .filter(|ep| ep.active)
        .map(|ep| ep.pos)
        .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));
    let movement = goal
        .map(|g| (g - pos).normalize_or_zero())
        .unwrap_or(Vec2::ZERO);

    let target = session
        .enemies
        .iter()
        .filter(|e| e.state == EnemyState::Chase)
        .map(|e| e.pos)
        .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));

    session.handle_input(InputEvent::Joystick(movement));
    session.handle_input(InputEvent::Pointer(target));
    session.handle_input(InputEvent::MouseFire(target.is_some()));
}

fn run(params: SessionParams) -> Result<(), SessionError> {
    let mut session = Session::new(params, Tuning::default())?;
    let mut clock = FrameClock::default();

    while !session.is_over() && session.time_ticks < TICK_CAP {
        autopilot(&mut session);
        for event in clock.advance(&mut session, SIM_DT) {
            match event {
                GameEvent::Snapshot(snap) if snap.tick % TICK_RATE as u64 == 0 => {
                    log::debug!(
                        "t={}s hp={:.0} ammo={} score={} extraction={:.0}ms",
                        snap.tick / TICK_RATE as u64,
                        snap.player.health,
                        snap.player.ammo,
                        snap.player.score,
                        snap.extraction_ms
                    );
                }
                GameEvent::SessionEnded { stats, extracted } => {
                    log::info!(
                        "{} after {} ticks",
                        if extracted { "Extracted" } else { "Killed" },
                        session.time_ticks
                    );
                    match serde_json::to_string_pretty(&stats) {
                        Ok(json) => println!("{}", json),
                        Err(e) => log::warn!("Could not serialize final stats: {}", e),
                    }
                }
                _ => {}
            }
        }
    }

    if !session.is_over() {
        log::warn!("Tick cap reached without an outcome");
    }
    Ok(())
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let params = match parse_args() {
        Ok(params) => params,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("usage: delta-ops [assault|support|recon|engineer] [normal|hard|insane] [seed]");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(params) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
