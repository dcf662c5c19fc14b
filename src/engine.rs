//! Game-loop driver
//!
//! Owns one session's state plus everything around it: fixed-step
//! accumulator, audio, layout and host notifications. The platform layer
//! feeds it frame deltas and raw input; it never schedules anything itself.

use glam::Vec2;
use serde::Serialize;

use crate::audio::{AudioManager, AudioSink, SoundEffect};
use crate::config::EngineConfig;
use crate::consts::*;
use crate::highscores::{HighScoreEntry, SessionScores};
use crate::input::{self, InputCommand, InputEvent};
use crate::renderer::{self, GuardedSurface, Layout, RenderOptions, Surface};
use crate::sim::state::{GameEvent, GameMode, GamePhase, GameState, next_seed};
use crate::sim::tick::{self, Action, TickInput};

/// Notifications for the surrounding page. Each method defaults to a no-op.
pub trait HostCallbacks {
    fn on_score_change(&mut self, _score: u64) {}
    fn on_state_change(&mut self, _phase: GamePhase) {}
    fn on_close(&mut self) {}
}

/// Host that ignores everything
#[derive(Debug, Default)]
pub struct NoopHost;

impl HostCallbacks for NoopHost {}

/// Serializable HUD view for the host page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub score: u64,
    pub best: u64,
    pub combo: u32,
    pub combo_multiplier: f32,
    pub tier: u32,
    pub shield: bool,
    pub magnet_ticks: u32,
    pub boost_ticks: u32,
    pub session_id: u32,
    pub muted: bool,
}

/// Frames of camera shake after a crash
const SHAKE_FRAMES: f32 = 18.0;
const SHAKE_PIXELS: f32 = 9.0;

pub struct GameEngine {
    config: EngineConfig,
    state: GameState,
    audio: AudioManager,
    host: Box<dyn HostCallbacks>,
    scores: SessionScores,
    layout: Layout,
    /// Size handed to `resize`, applied by the next render
    pending_size: Option<(f32, f32)>,
    accumulator: f32,
    autopilot: bool,
    closed: bool,
    last_reported_score: u64,
    /// Best score when the current run started
    best_at_start: u64,
    shake: f32,
    frame: u64,
    warned_non_finite: bool,
}

impl GameEngine {
    pub fn new(
        config: EngineConfig,
        sink: Box<dyn AudioSink>,
        host: Box<dyn HostCallbacks>,
    ) -> Self {
        let seed = config.initial_seed();
        let state = GameState::new(config.session_options(), seed);
        let mut audio = AudioManager::new(sink);
        audio.apply_settings(&config.settings);
        log::info!(
            "Engine ready: {} / {} (seed {})",
            config.mode.as_str(),
            config.difficulty.as_str(),
            seed
        );
        Self {
            config,
            state,
            audio,
            host,
            scores: SessionScores::new(),
            layout: Layout::default(),
            pending_size: None,
            accumulator: 0.0,
            autopilot: false,
            closed: false,
            last_reported_score: 0,
            best_at_start: 0,
            shake: 0.0,
            frame: 0,
            warned_non_finite: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn scores(&self) -> &SessionScores {
        &self.scores
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.settings.muted = muted;
        self.audio.set_muted(muted);
    }

    /// Advance by a frame delta in seconds. Returns the ticks run.
    pub fn update(&mut self, dt: f32) -> u32 {
        if self.closed {
            return 0;
        }
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.accumulator += dt;

        let input = TickInput {
            actions: Vec::new(),
            autopilot: self.autopilot,
        };
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick::tick(&mut self.state, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;
            self.process_events();
        }
        // Drop backlog we could not simulate this frame
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }

        self.frame += 1;
        self.shake = (self.shake - substeps as f32).max(0.0);
        substeps
    }

    /// Apply a raw input immediately
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if self.closed {
            return false;
        }
        let command = match event {
            // Any tap leaves the start screen, wherever it lands
            InputEvent::PointerDown { .. } if self.state.phase == GamePhase::Start => {
                Some(InputCommand::Action(Action::Primary))
            }
            _ => input::map_event(event, self.state.mode(), self.layout.width),
        };
        match command {
            Some(InputCommand::Action(action)) => self.apply(action),
            Some(InputCommand::Close) => {
                self.close();
                true
            }
            None => false,
        }
    }

    /// Apply a decoded action immediately
    pub fn apply(&mut self, action: Action) -> bool {
        if self.closed {
            return false;
        }
        // Any gesture unlocks audio in the browser
        self.audio.resume();
        let changed = tick::apply_action(&mut self.state, action);
        self.process_events();
        changed
    }

    /// Fresh session in Start with the same options
    pub fn reset(&mut self) {
        if self.closed {
            return;
        }
        let session_id = self.state.session_id.wrapping_add(1);
        let seed = next_seed(self.state.seed);
        let previous = self.state.phase;
        self.state = GameState::new(self.config.session_options(), seed);
        self.state.session_id = session_id;
        self.accumulator = 0.0;
        self.shake = 0.0;
        log::info!("Reset: session {}", session_id);
        if previous != GamePhase::Start {
            self.host.on_state_change(GamePhase::Start);
        }
        self.report_score();
    }

    /// Note a new surface size; layout is rebuilt at the start of the next render
    pub fn resize(&mut self, width: f32, height: f32) {
        log::info!("Resize requested: {}x{}", width, height);
        self.pending_size = Some((width, height));
    }

    /// Size from the last `resize` not yet applied by a render
    pub fn pending_size(&self) -> Option<(f32, f32)> {
        self.pending_size
    }

    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.closed {
            return;
        }
        // The surface is authoritative; a stale resize request only gets logged
        let (w, h) = surface.size();
        let requested = self.pending_size.take();
        if let Some((rw, rh)) = requested {
            if (rw, rh) != (w, h) {
                log::debug!("Resize to {}x{} superseded by surface {}x{}", rw, rh, w, h);
            }
        }
        if requested.is_some() || (w, h) != self.layout.size() {
            let layout = Layout::new(w, h);
            if layout != self.layout {
                log::info!("Layout recomputed for {}x{}", layout.width, layout.height);
            }
            self.layout = layout;
        }

        let mut options = RenderOptions::from_settings(&self.config.settings);
        options.best = self.scores.best();
        options.shake = self.shake_offset();

        let mut guarded = GuardedSurface::new(surface);
        renderer::draw(&mut guarded, &self.state, &self.layout, &options);
        if guarded.skipped() > 0 && !self.warned_non_finite {
            self.warned_non_finite = true;
            log::warn!("Skipped {} non-finite draw calls", guarded.skipped());
        }
    }

    /// Stop for good: release audio and tell the host once
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.audio.close();
        log::info!("Engine closed (session {})", self.state.session_id);
        self.host.on_close();
    }

    pub fn hud(&self) -> HudSnapshot {
        let effects = &self.state.effects;
        HudSnapshot {
            mode: self.state.mode(),
            phase: self.state.phase,
            score: self.state.score,
            best: self.scores.best().max(self.state.score),
            combo: self.state.combo,
            combo_multiplier: self.state.combo_multiplier(),
            tier: self.state.tier,
            shield: effects.shield,
            magnet_ticks: effects.magnet_ticks,
            boost_ticks: effects.boost_ticks,
            session_id: self.state.session_id,
            muted: self.audio.is_muted(),
        }
    }

    fn shake_offset(&self) -> Vec2 {
        if self.shake <= 0.0 || !self.config.settings.effective_screen_shake() {
            return Vec2::ZERO;
        }
        let amp = SHAKE_PIXELS * self.shake / SHAKE_FRAMES;
        let t = self.frame as f32;
        Vec2::new((t * 2.7).sin(), (t * 3.1).cos()) * amp
    }

    /// Route drained sim events to audio, host and scores
    fn process_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(effect) = SoundEffect::for_event(&event) {
                self.audio.play(effect);
            }
            match event {
                GameEvent::PhaseChanged { to, .. } => {
                    match to {
                        GamePhase::Playing => self.best_at_start = self.scores.best(),
                        GamePhase::GameOver => self.finish_run(),
                        GamePhase::Start => {}
                    }
                    self.host.on_state_change(to);
                }
                GameEvent::Crashed => self.shake = SHAKE_FRAMES,
                _ => {}
            }
        }
        self.report_score();
    }

    fn finish_run(&mut self) {
        let score = self.state.score;
        let rank = self.scores.record_run(HighScoreEntry {
            score,
            mode: self.state.mode(),
            difficulty: self.state.options.difficulty,
            session_id: self.state.session_id,
        });
        if score > self.best_at_start {
            self.audio.play(SoundEffect::HighScore);
        }
        log::info!(
            "Run over: score {} (rank {:?}, best {})",
            score,
            rank,
            self.scores.best()
        );
    }

    fn report_score(&mut self) {
        let score = self.state.score;
        self.scores.observe(score);
        if score != self.last_reported_score {
            self.last_reported_score = score;
            self.host.on_score_change(score);
        }
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        if !self.closed {
            self.audio.close();
        }
    }
}
