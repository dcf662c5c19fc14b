//! Property tests over the simulation and renderer math

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use party_arcade::SessionScores;
use party_arcade::consts::{FAR_PLANE, LANE_COUNT, NEAR_PLANE};
use party_arcade::highscores::{HighScoreEntry, MAX_HIGH_SCORES};
use party_arcade::renderer::{Layout, Projection};
use party_arcade::sim::spawner::{Pattern, build_pattern};
use party_arcade::sim::{
    Action, Difficulty, GameMode, GamePhase, GameState, SessionOptions, TickInput, apply_action,
    tick,
};

fn mode_strategy() -> impl Strategy<Value = GameMode> {
    prop_oneof![Just(GameMode::Flappy), Just(GameMode::Runner)]
}

fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Normal),
        Just(Difficulty::Hard)
    ]
}

/// Gameplay actions only; restarts are covered separately
fn gameplay_action() -> impl Strategy<Value = Option<Action>> {
    prop_oneof![
        4 => Just(None),
        1 => Just(Some(Action::Primary)),
        1 => Just(Some(Action::Jump)),
        1 => Just(Some(Action::MoveLeft)),
        1 => Just(Some(Action::MoveRight)),
    ]
}

fn session(mode: GameMode, difficulty: Difficulty, seed: u64) -> GameState {
    let options = SessionOptions {
        mode,
        difficulty,
        ..Default::default()
    };
    GameState::new(options, seed)
}

fn game_over(mode: GameMode, seed: u64) -> GameState {
    let mut state = session(mode, Difficulty::Normal, seed);
    apply_action(&mut state, Action::Primary);
    state.score = 7;
    state.set_phase(GamePhase::GameOver);
    state.drain_events();
    state
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn score_never_decreases_within_a_session(
        seed in any::<u64>(),
        mode in mode_strategy(),
        difficulty in difficulty_strategy(),
        autopilot in any::<bool>(),
        actions in prop::collection::vec(gameplay_action(), 1..600),
    ) {
        let mut state = session(mode, difficulty, seed);
        apply_action(&mut state, Action::Primary);
        let mut last = state.score;
        for action in actions {
            let input = TickInput {
                actions: action.into_iter().collect(),
                autopilot,
            };
            tick(&mut state, &input);
            prop_assert!(state.score >= last, "score fell from {} to {}", last, state.score);
            last = state.score;
        }
    }

    #[test]
    fn best_is_the_max_of_observed_scores(scores in prop::collection::vec(0u64..10_000, 0..40)) {
        let mut board = SessionScores::new();
        for (i, &score) in scores.iter().enumerate() {
            board.record_run(HighScoreEntry {
                score,
                mode: GameMode::Runner,
                difficulty: Difficulty::Normal,
                session_id: i as u32,
            });
        }
        prop_assert_eq!(board.best(), scores.iter().copied().max().unwrap_or(0));
        prop_assert!(board.entries.len() <= MAX_HIGH_SCORES);
        prop_assert!(board.entries.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn blocking_patterns_leave_one_lane_open(seed in any::<u64>(), barrier in any::<bool>()) {
        let pattern = if barrier { Pattern::Barrier } else { Pattern::DoubleBlock };
        let mut rng = Pcg32::seed_from_u64(seed);
        let (placed, _) = build_pattern(&mut rng, pattern);

        let mut blocked = [false; LANE_COUNT as usize];
        for (kind, pos) in &placed {
            prop_assert!(kind.is_hazard());
            let lane = party_arcade::nearest_lane(pos.x) as usize;
            prop_assert!(!blocked[lane], "lane {} blocked twice", lane);
            blocked[lane] = true;
        }
        prop_assert_eq!(blocked.iter().filter(|&&b| !b).count(), 1);
    }

    #[test]
    fn farther_points_project_smaller_and_closer_to_the_horizon(
        width in 200.0f32..2000.0,
        height in 200.0f32..2000.0,
        x in -150.0f32..150.0,
        near_z in (-NEAR_PLANE + 1.0)..(FAR_PLANE - 10.0),
        dz in 1.0f32..500.0,
    ) {
        let far_z = (near_z + dz).min(FAR_PLANE);
        let projection = Projection::from_layout(&Layout::new(width, height));
        let near = projection.project(x, 0.0, near_z).expect("near point visible");
        let far = projection.project(x, 0.0, far_z).expect("far point visible");

        prop_assert!(far.scale < near.scale);
        prop_assert!(far.pos.y <= near.pos.y);
        let far_dx = (far.pos.x - projection.center_x).abs();
        let near_dx = (near.pos.x - projection.center_x).abs();
        prop_assert!(far_dx <= near_dx + 1e-3);
    }

    #[test]
    fn game_over_ignores_gameplay_actions(
        seed in any::<u64>(),
        mode in mode_strategy(),
        actions in prop::collection::vec(
            prop_oneof![
                Just(Action::Primary),
                Just(Action::Jump),
                Just(Action::MoveLeft),
                Just(Action::MoveRight),
            ],
            1..20,
        ),
    ) {
        let mut state = game_over(mode, seed);
        let before = format!("{:?}", state);
        for action in actions {
            prop_assert!(!apply_action(&mut state, action));
        }
        prop_assert_eq!(format!("{:?}", state), before);
    }

    #[test]
    fn restart_is_the_only_way_out_of_game_over(seed in any::<u64>(), mode in mode_strategy()) {
        let mut state = game_over(mode, seed);
        let session_id = state.session_id;
        prop_assert!(apply_action(&mut state, Action::Restart));
        prop_assert_eq!(state.phase, GamePhase::Playing);
        prop_assert_eq!(state.score, 0);
        prop_assert_eq!(state.session_id, session_id + 1);
        prop_assert!(state.entities.is_empty());
    }

    #[test]
    fn start_only_accepts_primary(seed in any::<u64>(), mode in mode_strategy()) {
        let mut state = session(mode, Difficulty::Normal, seed);
        for action in [Action::Jump, Action::MoveLeft, Action::MoveRight, Action::Restart] {
            prop_assert!(!apply_action(&mut state, action));
            prop_assert_eq!(state.phase, GamePhase::Start);
        }
        prop_assert!(apply_action(&mut state, Action::Primary));
        prop_assert_eq!(state.phase, GamePhase::Playing);
    }
}
