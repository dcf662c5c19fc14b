//! Game state and core simulation types
//!
//! Everything one play session needs lives in [`GameState`]. A restart builds
//! a brand new state; nothing from the previous session is reused.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle/menu scene, avatar animates in place
    Start,
    /// Full simulation active
    Playing,
    /// Simulation frozen, waiting for restart
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Start => "start",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "gameover",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which mini-game a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Flappy,
    #[default]
    Runner,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Flappy => "flappy",
            GameMode::Runner => "runner",
        }
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flappy" | "bird" => Ok(GameMode::Flappy),
            "runner" | "run" => Ok(GameMode::Runner),
            other => Err(format!("unknown game mode '{other}'")),
        }
    }
}

/// Difficulty tier selected before a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Points multiplier applied to every award
    pub fn score_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Normal => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" | "med" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// Runner character (cosmetic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    #[default]
    Fox,
    Panda,
    Robot,
}

/// Options chosen before play that survive restarts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub character: Character,
    /// Particle cap (0 disables cosmetic particles)
    pub max_particles: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            difficulty: Difficulty::default(),
            character: Character::default(),
            max_particles: MAX_PARTICLES,
        }
    }
}

/// The flappy bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlappyAvatar {
    /// Center height (screen space, grows downward)
    pub y: f32,
    pub vy: f32,
    /// Smoothed nose tilt (radians)
    pub tilt: f32,
    /// Wing animation phase
    pub wing_phase: f32,
}

impl Default for FlappyAvatar {
    fn default() -> Self {
        Self {
            y: FLAPPY_GROUND_Y * 0.45,
            vy: 0.0,
            tilt: 0.0,
            wing_phase: 0.0,
        }
    }
}

/// The lane runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerAvatar {
    /// Target lane index
    pub lane: u8,
    /// Smoothed lateral position (world units)
    pub x: f32,
    /// Height above the road (0 = grounded)
    pub height: f32,
    /// Vertical velocity (positive = rising)
    pub vy: f32,
    pub jumping: bool,
    /// Smoothed lean toward the target lane
    pub tilt: f32,
    /// Run-cycle animation phase
    pub run_phase: f32,
}

impl Default for RunnerAvatar {
    fn default() -> Self {
        let lane = LANE_COUNT / 2;
        Self {
            lane,
            x: crate::lane_x(lane),
            height: 0.0,
            vy: 0.0,
            jumping: false,
            tilt: 0.0,
            run_phase: 0.0,
        }
    }
}

impl RunnerAvatar {
    #[inline]
    pub fn is_grounded(&self) -> bool {
        !self.jumping
    }
}

/// Player avatar, one variant per mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Avatar {
    Flappy(FlappyAvatar),
    Runner(RunnerAvatar),
}

impl Avatar {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Flappy => Avatar::Flappy(FlappyAvatar::default()),
            GameMode::Runner => Avatar::Runner(RunnerAvatar::default()),
        }
    }
}

/// Power-up kinds (runner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Magnet,
    Boost,
}

/// Active power-up effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub shield: bool,
    pub shield_ticks: u32,
    pub magnet_ticks: u32,
    pub boost_ticks: u32,
}

impl ActiveEffects {
    #[inline]
    pub fn magnet_active(&self) -> bool {
        self.magnet_ticks > 0
    }

    #[inline]
    pub fn boost_active(&self) -> bool {
        self.boost_ticks > 0
    }

    /// Count all timers down one tick, clearing effects that expire
    pub fn tick(&mut self) {
        self.magnet_ticks = self.magnet_ticks.saturating_sub(1);
        self.boost_ticks = self.boost_ticks.saturating_sub(1);
        if self.shield {
            self.shield_ticks = self.shield_ticks.saturating_sub(1);
            if self.shield_ticks == 0 {
                self.shield = false;
            }
        }
    }

    pub fn activate(&mut self, kind: PowerUpKind, tuning: &Tuning) {
        match kind {
            PowerUpKind::Shield => {
                self.shield = true;
                self.shield_ticks = tuning.shield_ticks;
            }
            PowerUpKind::Magnet => self.magnet_ticks = tuning.magnet_ticks,
            PowerUpKind::Boost => self.boost_ticks = tuning.boost_ticks,
        }
    }
}

/// Particle look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Dust,
    Debris,
    Sparkle,
    Shockwave,
    Trail,
    Glow,
}

/// A particle for visual effects (never read by gameplay)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    /// Flappy: screen position. Runner: (lateral x, depth z)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Runner: height above the road
    pub height: f32,
    pub life: f32, // 0-1, decreases over time
    pub color: u32, // 0xRRGGBB
    pub rotation: f32,
    pub size: f32,
}

/// Default particle cap
pub const MAX_PARTICLES: usize = 256;

/// Runner sky palette selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Dusk,
    Night,
    Dawn,
}

/// Runner overlay effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Rain,
    Snow,
}

pub const TIME_OF_DAY_TICKS: u64 = 1800;
pub const WEATHER_TICKS: u64 = 2700;

/// Something that happened during a tick. Drained by the engine for audio and HUD.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Flapped,
    Jumped,
    Landed,
    LaneChanged { lane: u8 },
    Scored { points: u64 },
    PipePassed,
    Collected { combo: u32, points: u64 },
    PowerUp { kind: PowerUpKind },
    ShieldBroken,
    ObstacleSmashed,
    ObstacleCleared { points: u64 },
    Crashed,
    Milestone { tier: u32 },
}

/// Complete state of one play session (deterministic given seed and actions)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Incremented on every restart so hosts can tell sessions apart
    pub session_id: u32,
    pub options: SessionOptions,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Score (never decreases)
    pub score: u64,
    /// Fractional passive score not yet credited
    pub score_carry: f32,
    pub combo: u32,
    /// Ticks left in the combo window
    pub combo_ticks: u32,
    /// Ticks since the state was created (drives cosmetics)
    pub time_ticks: u64,
    /// Ticks spent in Playing
    pub play_ticks: u64,
    /// Cumulative forward distance
    pub world_offset: f32,
    /// Current progression speed (distance per tick)
    pub speed: f32,
    /// World offset at which the next spawn batch is generated
    pub next_spawn_at: f32,
    /// Highest milestone tier announced so far
    pub tier: u32,
    pub avatar: Avatar,
    pub effects: ActiveEffects,
    /// Obstacles, collectibles and power-ups (sorted by id)
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    pub stats: RunStats,
    /// Next entity ID
    next_id: u32,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub pickups: u32,
    pub powerups: u32,
    pub obstacles_cleared: u32,
    pub obstacles_smashed: u32,
    pub pipes_passed: u32,
    pub best_combo: u32,
}

impl GameState {
    /// Create a new session in the Start phase
    pub fn new(options: SessionOptions, seed: u64) -> Self {
        let tuning = Tuning::new(options.mode, options.difficulty);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            session_id: 0,
            options,
            tuning,
            phase: GamePhase::Start,
            score: 0,
            score_carry: 0.0,
            combo: 0,
            combo_ticks: 0,
            time_ticks: 0,
            play_ticks: 0,
            world_offset: 0.0,
            speed: tuning.base_speed,
            next_spawn_at: first_spawn_offset(options.mode),
            tier: 0,
            avatar: Avatar::for_mode(options.mode),
            effects: ActiveEffects::default(),
            entities: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
            stats: RunStats::default(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn mode(&self) -> GameMode {
        self.options.mode
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fresh session with the same options, a derived seed and the next session id.
    /// The returned state is in Start; callers move it to Playing.
    pub fn restarted(&self) -> Self {
        let mut next = Self::new(self.options, next_seed(self.seed));
        next.session_id = self.session_id.wrapping_add(1);
        next
    }

    /// Reset the world for the Start → Playing transition, keeping options
    pub fn begin_play(&mut self) {
        self.world_offset = 0.0;
        self.speed = self.tuning.base_speed;
        self.next_spawn_at = first_spawn_offset(self.options.mode);
        self.play_ticks = 0;
        self.combo = 0;
        self.combo_ticks = 0;
        self.effects = ActiveEffects::default();
        self.entities.clear();
        self.avatar = Avatar::for_mode(self.options.mode);
    }

    /// Move to a new phase, recording the transition
    pub fn set_phase(&mut self, to: GamePhase) {
        if self.phase == to {
            return;
        }
        let from = self.phase;
        self.phase = to;
        log::info!("Session {} phase {} -> {}", self.session_id, from, to);
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Credit points; score only ever grows
    pub fn award(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::Scored { points });
    }

    /// Apply difficulty and combo multipliers to a base award
    pub fn points_for(&self, base: u32, combo_multiplier: f32) -> u64 {
        let raw = base as f32 * self.tuning.score_multiplier * combo_multiplier;
        (raw.round() as u64).max(1)
    }

    pub fn combo_multiplier(&self) -> f32 {
        combo_multiplier(self.combo)
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        match (self.time_ticks / TIME_OF_DAY_TICKS) % 4 {
            0 => TimeOfDay::Day,
            1 => TimeOfDay::Dusk,
            2 => TimeOfDay::Night,
            _ => TimeOfDay::Dawn,
        }
    }

    pub fn weather(&self) -> Weather {
        match (self.time_ticks / WEATHER_TICKS) % 4 {
            1 => Weather::Rain,
            3 => Weather::Snow,
            _ => Weather::Clear,
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Combo multiplier for a streak length
pub fn combo_multiplier(combo: u32) -> f32 {
    if combo <= 1 {
        1.0
    } else {
        (1.0 + 0.25 * (combo - 1) as f32).min(MAX_COMBO_MULTIPLIER)
    }
}

fn first_spawn_offset(mode: GameMode) -> f32 {
    match mode {
        // First pipe enters from the right edge shortly after takeoff
        GameMode::Flappy => 60.0,
        GameMode::Runner => 200.0,
    }
}

/// Derive the next session seed (PCG multiplier/increment)
pub fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_idle() {
        let state = GameState::new(SessionOptions::default(), 7);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.score, 0);
        assert!(state.entities.is_empty());
        assert!(matches!(state.avatar, Avatar::Runner(_)));
    }

    #[test]
    fn restart_is_fresh_session() {
        let mut state = GameState::new(SessionOptions::default(), 7);
        state.score = 900;
        state.combo = 4;
        let next = state.restarted();
        assert_eq!(next.session_id, 1);
        assert_eq!(next.score, 0);
        assert_eq!(next.combo, 0);
        assert_ne!(next.seed, state.seed);
        assert_eq!(next.options, state.options);
    }

    #[test]
    fn combo_multiplier_grows_and_caps() {
        assert_eq!(combo_multiplier(0), 1.0);
        assert_eq!(combo_multiplier(1), 1.0);
        assert_eq!(combo_multiplier(3), 1.5);
        assert_eq!(combo_multiplier(100), MAX_COMBO_MULTIPLIER);
    }

    #[test]
    fn effects_expire() {
        let tuning = Tuning::new(GameMode::Runner, Difficulty::Normal);
        let mut fx = ActiveEffects::default();
        fx.activate(PowerUpKind::Shield, &tuning);
        fx.activate(PowerUpKind::Boost, &tuning);
        for _ in 0..tuning.boost_ticks {
            fx.tick();
        }
        assert!(!fx.boost_active());
        assert!(fx.shield);
        for _ in 0..tuning.shield_ticks {
            fx.tick();
        }
        assert!(!fx.shield);
    }

    #[test]
    fn parse_mode_and_difficulty() {
        assert_eq!("Flappy".parse::<GameMode>(), Ok(GameMode::Flappy));
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("chess".parse::<GameMode>().is_err());
    }
}
