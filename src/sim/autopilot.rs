//! Idle/demo autopilot
//!
//! Picks actions for the attract screen and headless runs. Not perfect on
//! purpose: it reacts to the nearest threat only.

use super::entity::EntityKind;
use super::state::{Avatar, GamePhase, GameState};
use super::tick::Action;
use crate::consts::*;

/// Actions the autopilot would take this tick
pub fn actions(state: &GameState) -> Vec<Action> {
    match state.phase {
        GamePhase::Start => vec![Action::Primary],
        GamePhase::GameOver => Vec::new(),
        GamePhase::Playing => match &state.avatar {
            Avatar::Flappy(bird) => flappy(state, bird.y, bird.vy),
            Avatar::Runner(runner) => runner_actions(state, runner.lane, runner.is_grounded()),
        },
    }
}

fn flappy(state: &GameState, y: f32, vy: f32) -> Vec<Action> {
    let next_gap = state
        .entities
        .iter()
        .filter(|e| e.active)
        .filter_map(|e| match e.kind {
            EntityKind::PipeSegment { gap_center, .. }
                if e.pos.x + PIPE_WIDTH > BIRD_X - BIRD_HITBOX_HALF =>
            {
                Some((e.pos.x, gap_center))
            }
            _ => None,
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, center)| center);

    let target = next_gap.unwrap_or(FLAPPY_GROUND_Y * 0.45) + 12.0;
    if y > target && vy >= 0.0 {
        vec![Action::Primary]
    } else {
        Vec::new()
    }
}

fn lane_threat(state: &GameState, lane: u8, horizon: f32) -> Option<(f32, EntityKind)> {
    state
        .entities
        .iter()
        .filter(|e| e.active && e.kind.is_hazard() && e.lane() == lane)
        .filter(|e| e.z() > 0.0 && e.z() < horizon)
        .filter(|e| {
            !matches!(
                e.kind,
                EntityKind::Rock { cleared: true } | EntityKind::Cactus { cleared: true }
            )
        })
        .map(|e| (e.z(), e.kind))
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

fn runner_actions(state: &GameState, lane: u8, grounded: bool) -> Vec<Action> {
    if !grounded {
        return Vec::new();
    }
    let horizon = state.speed * 30.0;
    let Some((z, kind)) = lane_threat(state, lane, horizon) else {
        return Vec::new();
    };

    let jump_range = state.speed * 5.0 + 20.0;
    if kind != EntityKind::Barrier && z < jump_range {
        return vec![Action::Jump];
    }

    // Sidestep toward the closest clear lane
    let clear = (0..LANE_COUNT)
        .filter(|&l| l != lane && lane_threat(state, l, horizon).is_none())
        .min_by_key(|&l| (l as i16 - lane as i16).abs());
    match clear {
        Some(l) if l < lane => vec![Action::MoveLeft],
        Some(_) => vec![Action::MoveRight],
        None if kind != EntityKind::Barrier => Vec::new(),
        None => vec![if lane == 0 {
            Action::MoveRight
        } else {
            Action::MoveLeft
        }],
    }
}
