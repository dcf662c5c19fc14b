//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. The phase gates
//! which stages run: physics, spawning and collisions only while Playing.

use glam::Vec2;

use super::collision;
use super::entity::EntityKind;
use super::particles::{self, COLOR_BOOST, COLOR_DUST};
use super::physics::{self, FlightContact};
use super::spawner;
use super::state::{Avatar, GameEvent, GameMode, GamePhase, GameState, ParticleKind};
use crate::consts::*;

/// Gameplay intents, already decoded from raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start from the menu; flap/jump while playing
    Primary,
    Jump,
    MoveLeft,
    MoveRight,
    /// Game over → fresh session
    Restart,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Applied in order before the simulation step
    pub actions: Vec<Action>,
    /// Idle/demo mode - autopilot plays the game
    pub autopilot: bool,
}

/// Apply one action to the state machine. Returns true if it changed anything.
///
/// Legal transitions: Start → Playing (Primary), GameOver → Playing (Restart).
/// Gameplay actions outside Playing are ignored.
pub fn apply_action(state: &mut GameState, action: Action) -> bool {
    match (state.phase, action) {
        (GamePhase::Start, Action::Primary) => {
            state.begin_play();
            state.set_phase(GamePhase::Playing);
            if state.mode() == GameMode::Flappy {
                apply_action(state, Action::Primary);
            }
            true
        }
        (GamePhase::Playing, Action::Primary | Action::Jump) => jump(state),
        (GamePhase::Playing, Action::MoveLeft) => shift_lane(state, -1),
        (GamePhase::Playing, Action::MoveRight) => shift_lane(state, 1),
        (GamePhase::GameOver, Action::Restart) => {
            let mut next = state.restarted();
            next.begin_play();
            next.phase = GamePhase::Playing;
            next.events.push(GameEvent::PhaseChanged {
                from: GamePhase::GameOver,
                to: GamePhase::Playing,
            });
            log::info!(
                "Restart: session {} (seed {})",
                next.session_id,
                next.seed
            );
            *state = next;
            true
        }
        _ => false,
    }
}

fn jump(state: &mut GameState) -> bool {
    let tuning = state.tuning;
    match &mut state.avatar {
        Avatar::Flappy(bird) => {
            physics::flap(bird, &tuning);
            state.events.push(GameEvent::Flapped);
            true
        }
        Avatar::Runner(runner) => {
            if !physics::try_jump(runner, &tuning) {
                return false;
            }
            let at = Vec2::new(runner.x, 0.0);
            state.events.push(GameEvent::Jumped);
            particles::burst(state, ParticleKind::Dust, at, 0.0, 6, COLOR_DUST);
            true
        }
    }
}

fn shift_lane(state: &mut GameState, delta: i8) -> bool {
    let Avatar::Runner(runner) = &mut state.avatar else {
        return false;
    };
    if !physics::shift_lane(runner, delta) {
        return false;
    }
    let lane = runner.lane;
    state.events.push(GameEvent::LaneChanged { lane });
    true
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    for &action in &input.actions {
        apply_action(state, action);
    }
    if input.autopilot {
        for action in super::autopilot::actions(state) {
            apply_action(state, action);
        }
    }

    match state.phase {
        GamePhase::Start => {
            match &mut state.avatar {
                Avatar::Flappy(bird) => physics::idle_flappy(bird, state.time_ticks),
                Avatar::Runner(runner) => physics::idle_runner(runner),
            }
            particles::update(state, 0.0);
        }
        GamePhase::Playing => play_tick(state),
        GamePhase::GameOver => {
            // Frozen world; only cosmetic particles keep fading
            particles::update(state, 0.0);
        }
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Pure variant of [`tick`]: returns the next state, leaving `state` untouched
pub fn step(state: &GameState, input: &TickInput) -> GameState {
    let mut next = state.clone();
    tick(&mut next, input);
    next
}

fn play_tick(state: &mut GameState) {
    state.play_ticks += 1;
    state.effects.tick();
    if state.combo_ticks > 0 {
        state.combo_ticks -= 1;
        if state.combo_ticks == 0 {
            state.combo = 0;
        }
    }

    spawner::advance_speed(state);
    let travel = if state.effects.boost_active() {
        state.speed * state.tuning.boost_factor
    } else {
        state.speed
    };
    state.world_offset += travel;

    // --- Avatar physics ---
    let tuning = state.tuning;
    let mut ground_contact = None;
    let mut landed_at = None;
    match &mut state.avatar {
        Avatar::Flappy(bird) => {
            if physics::integrate_flappy(bird, &tuning) == FlightContact::Ground {
                ground_contact = Some(Vec2::new(BIRD_X, bird.y));
            }
        }
        Avatar::Runner(runner) => {
            if physics::integrate_runner(runner, &tuning, travel) {
                landed_at = Some(Vec2::new(runner.x, 0.0));
            }
        }
    }
    if let Some(at) = landed_at {
        state.events.push(GameEvent::Landed);
        particles::burst(state, ParticleKind::Dust, at, 0.0, 5, COLOR_DUST);
    }

    // --- Scroll the world toward the avatar ---
    let mode = state.mode();
    for entity in state.entities.iter_mut() {
        match mode {
            GameMode::Flappy => entity.pos.x -= travel,
            GameMode::Runner => entity.pos.y -= travel,
        }
    }

    spawner::update(state);
    collision::resolve(state);

    if let Some(at) = ground_contact {
        collision::crash(state, at);
    }

    if state.phase == GamePhase::Playing && state.tuning.distance_score_rate > 0.0 {
        let rate = state.tuning.distance_score_rate * state.tuning.score_multiplier;
        state.score_carry += travel * rate;
        let whole = state.score_carry.floor();
        if whole >= 1.0 {
            state.score_carry -= whole;
            state.award(whole as u64);
        }
    }

    cleanup(state);
    spawner::check_milestone(state);

    if state.effects.boost_active() && state.play_ticks % 3 == 0 {
        if let Avatar::Runner(runner) = &state.avatar {
            let at = Vec2::new(runner.x, 0.0);
            let height = runner.height + 20.0;
            particles::burst(state, ParticleKind::Trail, at, height, 2, COLOR_BOOST);
        }
    }
    particles::update(state, travel);
}

/// Deactivate entities that fell behind the avatar, then drop inactive ones
fn cleanup(state: &mut GameState) {
    let mode = state.mode();
    for entity in state.entities.iter_mut().filter(|e| e.active) {
        let gone = match (mode, entity.kind) {
            (GameMode::Flappy, EntityKind::PipeSegment { .. }) => {
                entity.pos.x + PIPE_WIDTH < -10.0
            }
            (GameMode::Flappy, _) => entity.pos.x < -20.0,
            (GameMode::Runner, _) => entity.pos.y < DESPAWN_DEPTH,
        };
        if gone {
            entity.deactivate();
        }
    }
    state.entities.retain(|e| e.active);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Entity;
    use crate::sim::state::{Difficulty, SessionOptions};

    fn runner() -> GameState {
        GameState::new(SessionOptions::default(), 12345)
    }

    fn flappy() -> GameState {
        GameState::new(
            SessionOptions {
                mode: GameMode::Flappy,
                ..Default::default()
            },
            12345,
        )
    }

    fn press(action: Action) -> TickInput {
        TickInput {
            actions: vec![action],
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_start_to_playing() {
        let mut state = runner();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Start);
        assert!(state.entities.is_empty());

        tick(&mut state, &press(Action::Primary));
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state
            .drain_events()
            .contains(&GameEvent::PhaseChanged {
                from: GamePhase::Start,
                to: GamePhase::Playing
            }));
    }

    #[test]
    fn gameplay_input_ignored_outside_playing() {
        let mut state = runner();
        assert!(!apply_action(&mut state, Action::MoveLeft));
        assert!(!apply_action(&mut state, Action::Jump));
        assert!(!apply_action(&mut state, Action::Restart));

        state.phase = GamePhase::GameOver;
        let before = format!("{:?}", state.avatar);
        assert!(!apply_action(&mut state, Action::Jump));
        assert!(!apply_action(&mut state, Action::Primary));
        assert!(!apply_action(&mut state, Action::MoveRight));
        assert_eq!(format!("{:?}", state.avatar), before);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn restart_rebuilds_session() {
        let mut state = runner();
        apply_action(&mut state, Action::Primary);
        state.score = 321;
        state
            .entities
            .push(Entity::new(99, EntityKind::Star, Vec2::new(0.0, 500.0)));
        state.phase = GamePhase::GameOver;

        assert!(apply_action(&mut state, Action::Restart));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.session_id, 1);
        assert_eq!(state.score, 0);
        assert!(state.entities.is_empty());
        assert_eq!(state.options.difficulty, Difficulty::Normal);
    }

    #[test]
    fn hazard_at_avatar_ends_run_in_one_tick() {
        let mut state = runner();
        apply_action(&mut state, Action::Primary);
        if let Avatar::Runner(r) = &mut state.avatar {
            r.lane = 0;
            r.x = crate::lane_x(0);
        }
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Rock { cleared: false },
            Vec2::new(crate::lane_x(0), state.speed),
        ));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn flappy_falls_to_ground_and_dies() {
        let mut state = flappy();
        tick(&mut state, &press(Action::Primary));
        for _ in 0..600 {
            tick(&mut state, &TickInput::default());
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn flappy_start_flaps() {
        let mut state = flappy();
        apply_action(&mut state, Action::Primary);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Flapped));
    }

    #[test]
    fn runner_score_grows_with_distance() {
        let mut state = runner();
        tick(&mut state, &press(Action::Primary));
        for _ in 0..120 {
            tick(&mut state, &TickInput::default());
        }
        if state.phase == GamePhase::Playing {
            assert!(state.score > 0);
        }
        assert!(state.world_offset > 0.0);
    }

    #[test]
    fn gameover_freezes_world() {
        let mut state = runner();
        tick(&mut state, &press(Action::Primary));
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        state.set_phase(GamePhase::GameOver);
        let offset = state.world_offset;
        let score = state.score;
        let count = state.entities.len();
        for _ in 0..50 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.world_offset, offset);
        assert_eq!(state.score, score);
        assert_eq!(state.entities.len(), count);
    }

    #[test]
    fn step_is_pure() {
        let state = runner();
        let next = step(&state, &press(Action::Primary));
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(next.phase, GamePhase::Playing);
    }

    #[test]
    fn test_determinism() {
        let mut a = runner();
        let mut b = runner();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.entities.len(), b.entities.len());
        assert_eq!(a.phase, b.phase);
    }

    #[test]
    fn entities_culled_behind_avatar() {
        let mut state = runner();
        apply_action(&mut state, Action::Primary);
        if let Avatar::Runner(r) = &mut state.avatar {
            r.lane = 0;
            r.x = crate::lane_x(0);
        }
        let id = state.next_entity_id();
        state.entities.push(Entity::new(
            id,
            EntityKind::Barrier,
            Vec2::new(crate::lane_x(2), -100.0),
        ));
        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.entities.iter().all(|e| e.id != id));
    }
}
