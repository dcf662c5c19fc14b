//! Spawner and difficulty controller
//!
//! Keeps a rolling window of entities ahead of the avatar. A spawn batch is
//! generated whenever the world offset passes `next_spawn_at`; the threshold
//! then advances by a gap that tightens with score milestones.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityKind};
use super::state::{GameEvent, GameMode, GameState, PowerUpKind};
use crate::consts::*;
use crate::lane_x;
use crate::tuning::Tuning;

/// Runner spawn pattern categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// One jumpable hazard in a random lane
    Single,
    /// Barriers in every lane but one
    Barrier,
    /// Jumpable hazards in every lane but one
    DoubleBlock,
    /// A short line of stars in one lane
    CollectibleRun,
    /// A single power-up pickup
    PowerUp,
}

pub const PATTERNS: [Pattern; 5] = [
    Pattern::Single,
    Pattern::Barrier,
    Pattern::DoubleBlock,
    Pattern::CollectibleRun,
    Pattern::PowerUp,
];

/// Stars per collectible run, and their spacing in depth
pub const RUN_LENGTH: usize = 5;
pub const RUN_SPACING: f32 = 60.0;

/// Distance until the next spawn batch
///
/// `base_gap * gap_modifier * (1 - tightening)`, stretched with speed so the
/// time between batches stays playable, and never below `min_gap`.
pub fn spawn_gap(tuning: &Tuning, score: u64, speed: f32) -> f32 {
    let tightening = tuning.tightening(score);
    let speed_stretch = (speed / tuning.base_speed).max(1.0);
    (tuning.base_gap * tuning.gap_modifier * (1.0 - tightening) * speed_stretch)
        .max(tuning.min_gap)
}

/// Pattern weights for a milestone tier (same order as [`PATTERNS`])
pub fn pattern_weights(tier: u32) -> [f32; 5] {
    let t = tier as f32;
    let power_up = (0.14 - 0.02 * t).max(0.04);
    let barrier = (0.10 + 0.04 * t).min(0.30);
    let double = if tier >= 1 {
        (0.05 + 0.04 * t).min(0.25)
    } else {
        0.0
    };
    let run = 0.25;
    let single = (1.0 - power_up - barrier - double - run).max(0.0);
    [single, barrier, double, run, power_up]
}

/// Weighted random pick among the runner patterns
pub fn choose_pattern(rng: &mut Pcg32, tier: u32) -> Pattern {
    let weights = pattern_weights(tier);
    let total: f32 = weights.iter().sum();
    let mut roll = rng.random::<f32>() * total;
    for (pattern, weight) in PATTERNS.iter().zip(weights) {
        if roll < weight {
            return *pattern;
        }
        roll -= weight;
    }
    Pattern::Single
}

fn jumpable_hazard(rng: &mut Pcg32) -> EntityKind {
    if rng.random_bool(0.5) {
        EntityKind::Rock { cleared: false }
    } else {
        EntityKind::Cactus { cleared: false }
    }
}

/// Lay out one runner pattern. Positions are (lateral x, depth offset from the
/// spawn line); returns the entities and the depth the batch occupies.
///
/// Blocking patterns pick their safe lane before placing anything.
pub fn build_pattern(rng: &mut Pcg32, pattern: Pattern) -> (Vec<(EntityKind, Vec2)>, f32) {
    let mut out = Vec::new();
    let mut extent = 0.0;
    match pattern {
        Pattern::Single => {
            let lane = rng.random_range(0..LANE_COUNT);
            out.push((jumpable_hazard(rng), Vec2::new(lane_x(lane), 0.0)));
        }
        Pattern::Barrier | Pattern::DoubleBlock => {
            let safe_lane = rng.random_range(0..LANE_COUNT);
            for lane in (0..LANE_COUNT).filter(|&l| l != safe_lane) {
                let kind = if pattern == Pattern::Barrier {
                    EntityKind::Barrier
                } else {
                    jumpable_hazard(rng)
                };
                out.push((kind, Vec2::new(lane_x(lane), 0.0)));
            }
        }
        Pattern::CollectibleRun => {
            let lane = rng.random_range(0..LANE_COUNT);
            for i in 0..RUN_LENGTH {
                out.push((
                    EntityKind::Star,
                    Vec2::new(lane_x(lane), i as f32 * RUN_SPACING),
                ));
            }
            extent = (RUN_LENGTH - 1) as f32 * RUN_SPACING;
        }
        Pattern::PowerUp => {
            let lane = rng.random_range(0..LANE_COUNT);
            let kind = match rng.random_range(0..3u8) {
                0 => PowerUpKind::Shield,
                1 => PowerUpKind::Magnet,
                _ => PowerUpKind::Boost,
            };
            out.push((EntityKind::pickup_for(kind), Vec2::new(lane_x(lane), 0.0)));
        }
    }
    (out, extent)
}

/// Accelerate toward the tier's speed target, never past the tuning maximum
pub fn advance_speed(state: &mut GameState) {
    let target = state.tuning.speed_target(state.score);
    if state.speed < target {
        state.speed = (state.speed + state.tuning.speed_accel).min(target);
    }
    state.speed = state.speed.min(state.tuning.max_speed);
}

/// Generate a batch if the threshold was crossed
pub fn update(state: &mut GameState) {
    if state.world_offset < state.next_spawn_at {
        return;
    }
    let extent = match state.mode() {
        GameMode::Flappy => spawn_flappy_batch(state),
        GameMode::Runner => spawn_runner_batch(state),
    };
    let gap = spawn_gap(&state.tuning, state.score, state.speed);
    state.next_spawn_at += gap + extent;
}

fn spawn_flappy_batch(state: &mut GameState) -> f32 {
    let opening = state.tuning.pipe_opening_at(state.score);
    let margin = opening / 2.0 + 40.0;
    let lo = margin;
    let hi = (FLAPPY_GROUND_Y - margin).max(lo + 1.0);
    let gap_center = state.rng.random_range(lo..hi);
    let x = FLAPPY_WORLD_WIDTH + 10.0;

    let id = state.next_entity_id();
    state.entities.push(Entity::new(
        id,
        EntityKind::PipeSegment {
            gap_center,
            gap_size: opening,
            scored: false,
        },
        Vec2::new(x, gap_center),
    ));

    let star_chance = state.tuning.star_chance as f64;
    if state.rng.random_bool(star_chance) {
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Star,
            Vec2::new(x + PIPE_WIDTH / 2.0, gap_center),
        ));
    }
    0.0
}

fn spawn_runner_batch(state: &mut GameState) -> f32 {
    let tier = state.tuning.tier(state.score);
    let pattern = choose_pattern(&mut state.rng, tier);
    let (placed, extent) = build_pattern(&mut state.rng, pattern);
    log::debug!(
        "Spawn {:?} ({} entities) at offset {:.0}",
        pattern,
        placed.len(),
        state.world_offset
    );
    for (kind, offset) in placed {
        let id = state.next_entity_id();
        let pos = Vec2::new(offset.x, SPAWN_DEPTH + offset.y);
        state.entities.push(Entity::new(id, kind, pos));
    }
    extent
}

/// Announce newly reached milestone tiers
pub fn check_milestone(state: &mut GameState) {
    let tier = state.tuning.tier(state.score);
    if tier > state.tier {
        state.tier = tier;
        log::debug!("Milestone tier {} at score {}", tier, state.score);
        state.events.push(GameEvent::Milestone { tier });
    }
}
