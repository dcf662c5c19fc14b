//! Collision and scoring resolution
//!
//! One pass per Playing tick: proximity tests between the avatar hit-box and
//! every active entity, then outcome resolution (score, power-up, hazard).
//! Hit-boxes are inset from the drawn sprites.

use glam::Vec2;

use super::entity::EntityKind;
use super::particles::{self, COLOR_CRASH, COLOR_DEBRIS, COLOR_SHIELD, COLOR_STAR};
use super::state::{
    Avatar, GameEvent, GameMode, GamePhase, GameState, ParticleKind, PowerUpKind,
};
use crate::approach;
use crate::consts::*;

pub const PIPE_POINTS: u32 = 1;
pub const FLAPPY_STAR_POINTS: u32 = 5;
pub const STAR_POINTS: u32 = 10;
pub const CLEAR_BONUS: u32 = 25;
pub const SMASH_BONUS: u32 = 15;

/// Flappy star pickup radius
pub const FLAPPY_STAR_RADIUS: f32 = 12.0;

/// Runner proximity windows (depth, lateral half-width)
pub const HAZARD_HIT_DEPTH: f32 = 30.0;
pub const HAZARD_HIT_HALF_WIDTH: f32 = 45.0;
pub const PICKUP_HIT_DEPTH: f32 = 40.0;
pub const PICKUP_HIT_HALF_WIDTH: f32 = 50.0;

/// Magnet assist reach and pull factor
pub const MAGNET_REACH_X: f32 = 250.0;
pub const MAGNET_REACH_Z: f32 = 350.0;
pub const MAGNET_PULL: f32 = 0.15;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// The bird's collision square
pub fn bird_hitbox(y: f32) -> Rect {
    Rect::from_center(Vec2::new(BIRD_X, y), Vec2::splat(BIRD_HITBOX_HALF))
}

/// Top and bottom pipe bodies for a pipe pair
pub fn pipe_rects(x: f32, gap_center: f32, gap_size: f32) -> [Rect; 2] {
    let top = Rect::new(
        Vec2::new(x, f32::MIN),
        Vec2::new(x + PIPE_WIDTH, gap_center - gap_size / 2.0),
    );
    let bottom = Rect::new(
        Vec2::new(x, gap_center + gap_size / 2.0),
        Vec2::new(x + PIPE_WIDTH, f32::MAX),
    );
    [top, bottom]
}

/// Runner lateral/depth window test (avatar sits at depth 0)
#[inline]
pub fn in_window(avatar_x: f32, pos: Vec2, half_width: f32, depth: f32) -> bool {
    (pos.x - avatar_x).abs() < half_width && pos.y.abs() < depth
}

/// Per-entity result of the proximity pass
#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    PipePassed,
    Collect { base: u32 },
    PowerUp(PowerUpKind),
    Hazard,
    Cleared,
}

/// Run one collision pass (Playing only)
pub fn resolve(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let avatar_pos = match &state.avatar {
        Avatar::Flappy(bird) => (None, bird.y),
        Avatar::Runner(runner) => (Some(runner.x), runner.height),
    };
    let outcomes = match avatar_pos {
        (None, bird_y) => flappy_outcomes(state, bird_y),
        (Some(x), height) => runner_outcomes(state, x, height),
    };

    for (idx, outcome) in outcomes {
        match outcome {
            Outcome::PipePassed => {
                let points = state.points_for(PIPE_POINTS, 1.0);
                state.stats.pipes_passed += 1;
                state.award(points);
                state.events.push(GameEvent::PipePassed);
            }
            Outcome::Collect { base } => collect(state, idx, base),
            Outcome::PowerUp(kind) => power_up(state, idx, kind),
            Outcome::Cleared => {
                let points = state.points_for(CLEAR_BONUS, 1.0);
                state.stats.obstacles_cleared += 1;
                state.award(points);
                state.events.push(GameEvent::ObstacleCleared { points });
            }
            Outcome::Hazard => {
                if hit_hazard(state, idx) {
                    break;
                }
            }
        }
    }
}

fn flappy_outcomes(state: &mut GameState, bird_y: f32) -> Vec<(usize, Outcome)> {
    let hitbox = bird_hitbox(bird_y);
    let bird_center = Vec2::new(BIRD_X, bird_y);
    let mut outcomes = Vec::new();

    for (idx, entity) in state.entities.iter_mut().enumerate() {
        if !entity.active {
            continue;
        }
        let x = entity.pos.x;
        match &mut entity.kind {
            EntityKind::PipeSegment {
                gap_center,
                gap_size,
                scored,
            } => {
                let hit = pipe_rects(x, *gap_center, *gap_size)
                    .iter()
                    .any(|r| r.overlaps(&hitbox));
                if hit {
                    outcomes.push((idx, Outcome::Hazard));
                } else if !*scored && x + PIPE_WIDTH < hitbox.min.x {
                    *scored = true;
                    outcomes.push((idx, Outcome::PipePassed));
                }
            }
            EntityKind::Star => {
                if entity.pos.distance(bird_center) < BIRD_HITBOX_HALF + FLAPPY_STAR_RADIUS {
                    outcomes.push((
                        idx,
                        Outcome::Collect {
                            base: FLAPPY_STAR_POINTS,
                        },
                    ));
                }
            }
            _ => {}
        }
    }
    outcomes
}

fn runner_outcomes(state: &mut GameState, avatar_x: f32, height: f32) -> Vec<(usize, Outcome)> {
    let magnet = state.effects.magnet_active();
    let mut outcomes = Vec::new();

    for (idx, entity) in state.entities.iter_mut().enumerate() {
        if !entity.active {
            continue;
        }
        let hazard_height = entity.kind.hazard_height();
        let power = entity.kind.power_up();
        match &mut entity.kind {
            EntityKind::Star => {
                // Magnet nudges inside the same pass, before the pickup test
                let dx = avatar_x - entity.pos.x;
                let z = entity.pos.y;
                if magnet && dx.abs() <= MAGNET_REACH_X && (0.0..=MAGNET_REACH_Z).contains(&z) {
                    entity.pos.x = approach(entity.pos.x, avatar_x, MAGNET_PULL);
                }
                if in_window(avatar_x, entity.pos, PICKUP_HIT_HALF_WIDTH, PICKUP_HIT_DEPTH) {
                    outcomes.push((idx, Outcome::Collect { base: STAR_POINTS }));
                }
            }
            EntityKind::ShieldPickup | EntityKind::MagnetPickup | EntityKind::BoostPickup => {
                if let Some(kind) = power {
                    if in_window(avatar_x, entity.pos, PICKUP_HIT_HALF_WIDTH, PICKUP_HIT_DEPTH) {
                        outcomes.push((idx, Outcome::PowerUp(kind)));
                    }
                }
            }
            EntityKind::Rock { cleared } | EntityKind::Cactus { cleared } => {
                if *cleared
                    || !in_window(avatar_x, entity.pos, HAZARD_HIT_HALF_WIDTH, HAZARD_HIT_DEPTH)
                {
                    continue;
                }
                if height > hazard_height.unwrap_or(0.0) {
                    *cleared = true;
                    outcomes.push((idx, Outcome::Cleared));
                } else {
                    outcomes.push((idx, Outcome::Hazard));
                }
            }
            EntityKind::Barrier => {
                if in_window(avatar_x, entity.pos, HAZARD_HIT_HALF_WIDTH, HAZARD_HIT_DEPTH)
                    && height <= hazard_height.unwrap_or(f32::MAX)
                {
                    outcomes.push((idx, Outcome::Hazard));
                }
            }
            EntityKind::PipeSegment { .. } => {}
        }
    }
    outcomes
}

/// Pickup a collectible once. Runner pickups extend the combo; flappy
/// stars score flat.
fn collect(state: &mut GameState, idx: usize, base: u32) {
    if !state.entities[idx].deactivate() {
        return;
    }
    let multiplier = if state.mode() == GameMode::Runner {
        state.combo = if state.combo_ticks > 0 {
            state.combo + 1
        } else {
            1
        };
        state.combo_ticks = COMBO_WINDOW_TICKS;
        state.stats.best_combo = state.stats.best_combo.max(state.combo);
        state.combo_multiplier()
    } else {
        1.0
    };
    state.stats.pickups += 1;

    let points = state.points_for(base, multiplier);
    state.award(points);
    state.events.push(GameEvent::Collected {
        combo: state.combo,
        points,
    });

    let pos = state.entities[idx].pos;
    particles::burst(state, ParticleKind::Sparkle, pos, 30.0, 10, COLOR_STAR);
}

fn power_up(state: &mut GameState, idx: usize, kind: PowerUpKind) {
    if !state.entities[idx].deactivate() {
        return;
    }
    state.effects.activate(kind, &state.tuning);
    state.stats.powerups += 1;
    state.events.push(GameEvent::PowerUp { kind });

    let pos = state.entities[idx].pos;
    let color = match kind {
        PowerUpKind::Shield => COLOR_SHIELD,
        PowerUpKind::Magnet => particles::COLOR_MAGNET,
        PowerUpKind::Boost => particles::COLOR_BOOST,
    };
    particles::burst(state, ParticleKind::Glow, pos, 30.0, 12, color);
}

/// Resolve a hazard contact. Returns true if the run ended.
fn hit_hazard(state: &mut GameState, idx: usize) -> bool {
    let pos = state.entities[idx].pos;

    if state.effects.boost_active() {
        if state.entities[idx].deactivate() {
            state.stats.obstacles_smashed += 1;
            let points = state.points_for(SMASH_BONUS, 1.0);
            state.award(points);
            state.events.push(GameEvent::ObstacleSmashed);
            particles::burst(state, ParticleKind::Debris, pos, 20.0, 14, COLOR_DEBRIS);
        }
        return false;
    }

    if state.effects.shield {
        if state.entities[idx].deactivate() {
            state.effects.shield = false;
            state.effects.shield_ticks = 0;
            state.events.push(GameEvent::ShieldBroken);
            particles::burst(state, ParticleKind::Shockwave, pos, 40.0, 1, COLOR_SHIELD);
        }
        return false;
    }

    crash(state, pos);
    true
}

/// Terminal collision: Playing → GameOver exactly once
pub fn crash(state: &mut GameState, at: Vec2) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.combo = 0;
    state.combo_ticks = 0;
    state.set_phase(GamePhase::GameOver);
    state.events.push(GameEvent::Crashed);
    particles::burst(state, ParticleKind::Debris, at, 20.0, 18, COLOR_CRASH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Entity;
    use crate::sim::state::SessionOptions;

    fn playing_runner() -> GameState {
        let mut state = GameState::new(SessionOptions::default(), 11);
        state.begin_play();
        state.set_phase(GamePhase::Playing);
        state.events.clear();
        state
    }

    fn put(state: &mut GameState, kind: EntityKind, x: f32, z: f32) -> usize {
        let id = state.next_entity_id();
        state.entities.push(Entity::new(id, kind, Vec2::new(x, z)));
        state.entities.len() - 1
    }

    fn move_avatar_to_lane(state: &mut GameState, lane: u8) {
        if let Avatar::Runner(r) = &mut state.avatar {
            r.lane = lane;
            r.x = crate::lane_x(lane);
        }
    }

    #[test]
    fn hazard_in_lane_ends_run() {
        let mut state = playing_runner();
        move_avatar_to_lane(&mut state, 0);
        put(&mut state, EntityKind::Rock { cleared: false }, crate::lane_x(0), 0.0);
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn crash_reported_once() {
        let mut state = playing_runner();
        put(&mut state, EntityKind::Barrier, 0.0, 0.0);
        put(&mut state, EntityKind::Barrier, 0.0, 5.0);
        resolve(&mut state);
        resolve(&mut state);
        let crashes = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::Crashed)
            .count();
        assert_eq!(crashes, 1);
    }

    #[test]
    fn shield_absorbs_hazard() {
        let mut state = playing_runner();
        state.effects.activate(PowerUpKind::Shield, &state.tuning.clone());
        let idx = put(&mut state, EntityKind::Barrier, 0.0, 0.0);
        resolve(&mut state);
        assert!(!state.effects.shield);
        assert!(!state.entities[idx].active);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn boost_smashes_and_keeps_shield() {
        let mut state = playing_runner();
        let tuning = state.tuning;
        state.effects.activate(PowerUpKind::Boost, &tuning);
        state.effects.activate(PowerUpKind::Shield, &tuning);
        let idx = put(&mut state, EntityKind::Cactus { cleared: false }, 0.0, 0.0);
        resolve(&mut state);
        assert!(!state.entities[idx].active);
        assert!(state.effects.shield);
        assert!(state.score > 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn pickup_awarded_once() {
        let mut state = playing_runner();
        let idx = put(&mut state, EntityKind::Star, 0.0, 0.0);
        resolve(&mut state);
        let score = state.score;
        resolve(&mut state);
        assert!(!state.entities[idx].active);
        assert_eq!(state.score, score);
        assert_eq!(state.stats.pickups, 1);
    }

    #[test]
    fn three_quick_pickups_build_combo() {
        let mut state = playing_runner();
        let mut awards = Vec::new();
        for _ in 0..3 {
            put(&mut state, EntityKind::Star, 0.0, 0.0);
            let before = state.score;
            resolve(&mut state);
            awards.push(state.score - before);
            state.combo_ticks -= 10;
        }
        assert_eq!(state.combo, 3);
        let base = state.points_for(STAR_POINTS, 1.0);
        assert!(awards[2] > base);
        assert_eq!(awards[0], base);
    }

    #[test]
    fn jumping_clears_cactus_with_bonus_once() {
        let mut state = playing_runner();
        if let Avatar::Runner(r) = &mut state.avatar {
            r.jumping = true;
            r.height = 80.0;
        }
        let idx = put(&mut state, EntityKind::Cactus { cleared: false }, 0.0, 10.0);
        resolve(&mut state);
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.stats.obstacles_cleared, 1);
        assert!(matches!(
            state.entities[idx].kind,
            EntityKind::Cactus { cleared: true }
        ));
        // Descending through the window afterwards is not a crash
        if let Avatar::Runner(r) = &mut state.avatar {
            r.height = 0.0;
        }
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn barrier_cannot_be_jumped() {
        let mut state = playing_runner();
        if let Avatar::Runner(r) = &mut state.avatar {
            r.jumping = true;
            r.height = 110.0;
        }
        put(&mut state, EntityKind::Barrier, 0.0, 0.0);
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn magnet_pulls_nearby_stars() {
        let mut state = playing_runner();
        let tuning = state.tuning;
        state.effects.activate(PowerUpKind::Magnet, &tuning);
        let idx = put(&mut state, EntityKind::Star, crate::lane_x(2), 200.0);
        resolve(&mut state);
        assert!(state.entities[idx].pos.x < crate::lane_x(2));
        assert!(state.entities[idx].active);
    }

    #[test]
    fn flappy_pipe_pass_scores_once() {
        let options = SessionOptions {
            mode: GameMode::Flappy,
            ..Default::default()
        };
        let mut state = GameState::new(options, 3);
        state.begin_play();
        state.set_phase(GamePhase::Playing);
        let bird_y = match &state.avatar {
            Avatar::Flappy(b) => b.y,
            _ => unreachable!(),
        };
        put(
            &mut state,
            EntityKind::PipeSegment {
                gap_center: bird_y,
                gap_size: 150.0,
                scored: false,
            },
            BIRD_X - PIPE_WIDTH - BIRD_HITBOX_HALF - 1.0,
            bird_y,
        );
        resolve(&mut state);
        resolve(&mut state);
        assert_eq!(state.stats.pipes_passed, 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn flappy_pipe_body_is_fatal() {
        let options = SessionOptions {
            mode: GameMode::Flappy,
            ..Default::default()
        };
        let mut state = GameState::new(options, 3);
        state.begin_play();
        state.set_phase(GamePhase::Playing);
        put(
            &mut state,
            EntityKind::PipeSegment {
                gap_center: 60.0,
                gap_size: 100.0,
                scored: false,
            },
            BIRD_X - 10.0,
            60.0,
        );
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn flappy_stars_score_flat_without_combo() {
        let options = SessionOptions {
            mode: GameMode::Flappy,
            ..Default::default()
        };
        let mut state = GameState::new(options, 3);
        state.begin_play();
        state.set_phase(GamePhase::Playing);
        let bird_y = match &state.avatar {
            Avatar::Flappy(b) => b.y,
            _ => unreachable!(),
        };
        let flat = state.points_for(FLAPPY_STAR_POINTS, 1.0);
        for _ in 0..3 {
            put(&mut state, EntityKind::Star, BIRD_X, bird_y);
            let before = state.score;
            resolve(&mut state);
            assert_eq!(state.score - before, flat);
            assert_eq!(state.combo, 0);
            assert_eq!(state.combo_ticks, 0);
        }
        assert_eq!(state.stats.pickups, 3);
        assert_eq!(state.stats.best_combo, 0);
    }
}
