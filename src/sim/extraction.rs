//! Extraction timer and session end
//!
//! Standing within half an extraction point's radius fills the timer by
//! elapsed real time. Leaving drains it at a multiple of the fill rate,
//! floored at zero, so a short step outside only costs some progress.

use serde::Serialize;

use super::geom::within;
use super::snapshot::{PlayerStats, emit_now};
use super::state::{GameEvent, Outcome, Session};

/// Extraction state machine view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtractionPhase {
    NotExtracting,
    Extracting,
    Extracted,
}

impl Session {
    pub fn extraction_phase(&self) -> ExtractionPhase {
        if self.outcome == Outcome::Extracted {
            ExtractionPhase::Extracted
        } else if self.extracting {
            ExtractionPhase::Extracting
        } else {
            ExtractionPhase::NotExtracting
        }
    }
}

/// Advance the extraction timer by `dt_ms` of real time
pub fn update_extraction(session: &mut Session, dt_ms: f32) {
    let player_pos = session.player.pos;
    session.extracting = session
        .extraction_points
        .iter()
        .any(|ep| ep.active && within(player_pos, ep.pos, ep.radius / 2.0));

    if session.extracting {
        session.extraction_ms += dt_ms;
        if session.extraction_ms >= session.tuning.extraction_time_ms {
            finish_session(session, true);
        }
    } else {
        let drain = dt_ms * session.tuning.extraction_decay_factor;
        session.extraction_ms = (session.extraction_ms - drain).max(0.0);
    }
}

/// Apply end-of-session scoring, freeze the session and report the result
///
/// Calling this on a finished session does nothing.
pub fn finish_session(session: &mut Session, extracted: bool) {
    if session.is_over() {
        return;
    }

    let t = &session.tuning;
    let player = &mut session.player;
    if extracted {
        player.score += player.health.floor().max(0.0) as u64 * t.health_score_multiplier;
        if session.brick_decoded {
            player.score += t.decode_bonus;
        }
        session.outcome = Outcome::Extracted;
    } else {
        player.score = (player.score as f64 * t.death_score_factor).floor() as u64;
        session.outcome = Outcome::Dead;
    }

    log::info!(
        "Session ended at tick {}: {} with score {}",
        session.time_ticks,
        if extracted { "extracted" } else { "killed" },
        session.player.score
    );

    emit_now(session);
    let stats = PlayerStats::capture(session);
    session.emit(GameEvent::SessionEnded { stats, extracted });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::tuning::SessionParams;
    use glam::Vec2;

    const DT_MS: f32 = SIM_DT * 1000.0;

    fn fixture() -> Session {
        let mut session = Session::with_defaults(SessionParams::default());
        session.extraction_points[0].pos = Vec2::new(100.0, 1500.0);
        session.extraction_points[1].pos = Vec2::new(2900.0, 1500.0);
        session
    }

    #[test]
    fn test_half_radius_required() {
        let mut session = fixture();
        session.player.pos = Vec2::new(180.0, 1500.0);
        update_extraction(&mut session, DT_MS);
        assert_eq!(session.extraction_phase(), ExtractionPhase::NotExtracting);
        assert_eq!(session.extraction_ms, 0.0);

        session.player.pos = Vec2::new(170.0, 1500.0);
        update_extraction(&mut session, DT_MS);
        assert_eq!(session.extraction_phase(), ExtractionPhase::Extracting);
        assert!(session.extraction_ms > 0.0);
    }

    #[test]
    fn test_holding_extracts() {
        let mut session = fixture();
        session.player.pos = Vec2::new(100.0, 1500.0);
        for _ in 0..29 {
            update_extraction(&mut session, 100.0);
        }
        assert_eq!(session.outcome, Outcome::Running);
        update_extraction(&mut session, 100.0);
        assert_eq!(session.outcome, Outcome::Extracted);
        assert_eq!(session.extraction_phase(), ExtractionPhase::Extracted);
    }

    #[test]
    fn test_leaving_drains_twice_as_fast_and_floors() {
        let mut session = fixture();
        session.player.pos = Vec2::new(100.0, 1500.0);
        for _ in 0..10 {
            update_extraction(&mut session, 100.0);
        }
        assert_eq!(session.extraction_ms, 1000.0);

        session.player.pos = Vec2::new(1500.0, 1500.0);
        update_extraction(&mut session, 100.0);
        assert_eq!(session.extraction_ms, 800.0);
        for _ in 0..10 {
            update_extraction(&mut session, 100.0);
        }
        assert_eq!(session.extraction_ms, 0.0);

        // Re-entering keeps the drained progress, it does not jump back
        session.player.pos = Vec2::new(100.0, 1500.0);
        update_extraction(&mut session, 100.0);
        assert_eq!(session.extraction_ms, 100.0);
    }

    #[test]
    fn test_inactive_point_ignored() {
        let mut session = fixture();
        session.extraction_points[0].active = false;
        session.player.pos = Vec2::new(100.0, 1500.0);
        update_extraction(&mut session, 100.0);
        assert!(!session.extracting);
    }

    #[test]
    fn test_win_scoring_with_decode() {
        let mut session = fixture();
        session.player.score = 3000;
        session.player.health = 80.0;
        session.brick_decoded = true;
        finish_session(&mut session, true);
        assert_eq!(session.player.score, 3000 + 800 + 10_000);
    }

    #[test]
    fn test_win_scoring_floors_health() {
        let mut session = fixture();
        session.player.score = 0;
        session.player.health = 45.7;
        finish_session(&mut session, true);
        assert_eq!(session.player.score, 450);
    }

    #[test]
    fn test_loss_halves_and_floors() {
        let mut session = fixture();
        session.player.score = 5501;
        finish_session(&mut session, false);
        assert_eq!(session.player.score, 2750);
        assert_eq!(session.outcome, Outcome::Dead);
    }

    #[test]
    fn test_finish_reports_once() {
        let mut session = fixture();
        finish_session(&mut session, true);
        finish_session(&mut session, false);
        assert_eq!(session.outcome, Outcome::Extracted);
        let ended: Vec<_> = session
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::SessionEnded { .. }))
            .collect();
        assert_eq!(ended.len(), 1);
        assert!(matches!(
            session.events.first(),
            Some(GameEvent::Snapshot(_))
        ));
        match ended[0] {
            GameEvent::SessionEnded { stats, extracted } => {
                assert!(*extracted);
                assert_eq!(stats.score, session.player.score);
            }
            _ => unreachable!(),
        }
    }
}
