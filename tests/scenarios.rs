//! End-to-end scenarios through the engine's public API

use std::cell::RefCell;
use std::rc::Rc;

use party_arcade::audio::{NullAudioSink, RecordingAudioSink};
use party_arcade::consts::SIM_DT;
use party_arcade::input::InputEvent;
use party_arcade::renderer::{DrawCall, RecordingSurface};
use party_arcade::sim::{Avatar, Difficulty, GameMode, GamePhase};
use party_arcade::{EngineConfig, GameEngine, HostCallbacks};

#[derive(Debug, Default)]
struct HostLog {
    scores: Vec<u64>,
    states: Vec<GamePhase>,
    closes: u32,
}

#[derive(Clone, Default)]
struct Host(Rc<RefCell<HostLog>>);

impl HostCallbacks for Host {
    fn on_score_change(&mut self, score: u64) {
        self.0.borrow_mut().scores.push(score);
    }
    fn on_state_change(&mut self, phase: GamePhase) {
        self.0.borrow_mut().states.push(phase);
    }
    fn on_close(&mut self) {
        self.0.borrow_mut().closes += 1;
    }
}

fn config(mode: GameMode, seed: u64) -> EngineConfig {
    EngineConfig {
        seed: Some(seed),
        ..EngineConfig::new(mode, Difficulty::Normal)
    }
}

fn key(code: &str) -> InputEvent {
    InputEvent::KeyDown(code.to_string())
}

fn all_finite(surface: &RecordingSurface) -> bool {
    surface
        .calls
        .iter()
        .flat_map(DrawCall::numbers)
        .all(f32::is_finite)
}

#[test]
fn autopilot_session_renders_every_frame() {
    for mode in [GameMode::Flappy, GameMode::Runner] {
        let host = Host::default();
        let mut engine = GameEngine::new(
            config(mode, 11),
            Box::new(NullAudioSink),
            Box::new(host.clone()),
        );
        engine.set_autopilot(true);
        let mut surface = RecordingSurface::new(800.0, 600.0);

        for _ in 0..1200 {
            engine.update(SIM_DT);
            surface.clear();
            engine.render(&mut surface);
            assert!(!surface.calls.is_empty());
            assert!(all_finite(&surface), "{mode:?} drew a non-finite value");
        }

        let log = host.0.borrow();
        assert_eq!(log.states.first(), Some(&GamePhase::Playing));
        assert_eq!(engine.scores().best(), log.scores.iter().copied().max().unwrap_or(0));
    }
}

#[test]
fn flappy_run_ends_and_restarts_with_best_kept() {
    let host = Host::default();
    let sink = RecordingAudioSink::new();
    let mut engine = GameEngine::new(
        config(GameMode::Flappy, 5),
        Box::new(sink.clone()),
        Box::new(host.clone()),
    );

    assert!(engine.handle_input(&key("Space")));
    for _ in 0..600 {
        engine.update(SIM_DT);
        if engine.state().phase == GamePhase::GameOver {
            break;
        }
    }
    assert_eq!(engine.state().phase, GamePhase::GameOver);
    let tones_at_crash = sink.tone_count();
    assert!(tones_at_crash > 0);

    let best = engine.scores().best();
    let session = engine.state().session_id;
    assert!(!engine.handle_input(&key("Space")), "flap ignored after game over");
    assert!(engine.handle_input(&key("Enter")));

    assert_eq!(engine.state().phase, GamePhase::Playing);
    assert_eq!(engine.state().score, 0);
    assert_eq!(engine.state().session_id, session + 1);
    assert_eq!(engine.scores().best(), best);
    assert_eq!(
        host.0.borrow().states,
        vec![GamePhase::Playing, GamePhase::GameOver, GamePhase::Playing]
    );
}

#[test]
fn same_seed_same_inputs_same_session() {
    let run = || {
        let mut engine = GameEngine::new(
            config(GameMode::Runner, 99),
            Box::new(NullAudioSink),
            Box::new(Host::default()),
        );
        engine.handle_input(&key("Space"));
        let mut trace = Vec::new();
        for frame in 0..900u32 {
            match frame % 97 {
                13 => {
                    engine.handle_input(&key("ArrowLeft"));
                }
                41 => {
                    engine.handle_input(&key("ArrowUp"));
                }
                70 => {
                    engine.handle_input(&key("ArrowRight"));
                }
                _ => {}
            }
            engine.update(SIM_DT);
            let state = engine.state();
            trace.push((state.score, state.phase, state.entities.len()));
        }
        trace
    };
    assert_eq!(run(), run());
}

#[test]
fn runner_swipe_changes_lane() {
    let mut engine = GameEngine::new(
        config(GameMode::Runner, 3),
        Box::new(NullAudioSink),
        Box::new(Host::default()),
    );
    engine.handle_input(&key("Space"));

    let lane = |engine: &GameEngine| match &engine.state().avatar {
        Avatar::Runner(runner) => runner.lane,
        Avatar::Flappy(_) => unreachable!("runner session"),
    };
    assert_eq!(lane(&engine), 1);

    assert!(engine.handle_input(&InputEvent::from_touch((300.0, 300.0), (200.0, 310.0))));
    assert_eq!(lane(&engine), 0);
    // Already at the left edge
    assert!(!engine.handle_input(&InputEvent::from_touch((300.0, 300.0), (200.0, 300.0))));
    assert_eq!(lane(&engine), 0);
    // A short drag is a tap, and a right-third tap moves right
    assert!(engine.handle_input(&InputEvent::from_touch((390.0, 300.0), (395.0, 302.0))));
    assert_eq!(lane(&engine), 1);
}

#[test]
fn side_tap_starts_runner_from_start_screen() {
    let host = Host::default();
    let mut engine = GameEngine::new(
        config(GameMode::Runner, 6),
        Box::new(NullAudioSink),
        Box::new(host.clone()),
    );
    engine.render(&mut RecordingSurface::new(1200.0, 600.0));
    let lane = |engine: &GameEngine| match &engine.state().avatar {
        Avatar::Runner(runner) => runner.lane,
        Avatar::Flappy(_) => unreachable!("runner session"),
    };

    // A left-third tap on the start screen only starts the run
    assert!(engine.handle_input(&InputEvent::from_touch((100.0, 300.0), (102.0, 301.0))));
    assert_eq!(engine.state().phase, GamePhase::Playing);
    assert_eq!(lane(&engine), 1);
    assert_eq!(host.0.borrow().states, vec![GamePhase::Playing]);

    // Once playing the same tap steers
    assert!(engine.handle_input(&InputEvent::from_touch((100.0, 300.0), (102.0, 301.0))));
    assert_eq!(lane(&engine), 0);
}

#[test]
fn muted_options_play_nothing() {
    let sink = RecordingAudioSink::new();
    let json = r#"{"mode":"flappy","seed":4,"settings":{"muted":true}}"#;
    let config = EngineConfig::from_json(json).expect("valid options");
    let mut engine = GameEngine::new(config, Box::new(sink.clone()), Box::new(Host::default()));
    engine.handle_input(&key("Space"));
    for _ in 0..120 {
        engine.update(SIM_DT);
        engine.handle_input(&key("Space"));
    }
    assert_eq!(sink.tone_count(), 0);
    assert!(engine.hud().muted);

    engine.set_muted(false);
    assert!(!engine.hud().muted);
    engine.handle_input(&key("Space"));
    if engine.state().phase == GamePhase::Playing {
        assert!(sink.tone_count() > 0);
    }
}

#[test]
fn escape_closes_once_and_freezes_the_engine() {
    let host = Host::default();
    let sink = RecordingAudioSink::new();
    let mut engine = GameEngine::new(
        config(GameMode::Runner, 8),
        Box::new(sink.clone()),
        Box::new(host.clone()),
    );
    engine.handle_input(&key("Space"));
    engine.update(SIM_DT * 3.0);

    assert!(engine.handle_input(&key("Escape")));
    assert!(engine.is_closed());
    assert!(sink.is_closed());
    engine.close();
    assert_eq!(host.0.borrow().closes, 1);

    let ticks_before = engine.state().time_ticks;
    assert_eq!(engine.update(SIM_DT * 4.0), 0);
    assert!(!engine.handle_input(&key("ArrowLeft")));
    assert_eq!(engine.state().time_ticks, ticks_before);
}

#[test]
fn resize_rebuilds_layout_before_drawing() {
    let mut engine = GameEngine::new(
        config(GameMode::Runner, 21),
        Box::new(NullAudioSink),
        Box::new(Host::default()),
    );
    let mut small = RecordingSurface::new(360.0, 640.0);
    engine.render(&mut small);
    assert_eq!(engine.layout().size(), (360.0, 640.0));

    engine.resize(1280.0, 720.0);
    let mut wide = RecordingSurface::new(1280.0, 720.0);
    engine.render(&mut wide);
    assert_eq!(engine.layout().size(), (1280.0, 720.0));
    assert!(all_finite(&wide));
}

#[test]
fn hud_snapshot_serializes_for_the_host() {
    let mut engine = GameEngine::new(
        config(GameMode::Runner, 2),
        Box::new(NullAudioSink),
        Box::new(Host::default()),
    );
    engine.set_autopilot(true);
    for _ in 0..300 {
        engine.update(SIM_DT);
    }
    let json = serde_json::to_value(engine.hud()).expect("hud serializes");
    assert_eq!(json["score"].as_u64(), Some(engine.state().score));
    assert!(json["best"].as_u64() >= json["score"].as_u64());
    assert!(json.get("combo_multiplier").is_some());
}
