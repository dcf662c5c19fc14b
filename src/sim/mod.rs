//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entity;
pub mod particles;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;

pub use entity::{Entity, EntityKind};
pub use state::{
    ActiveEffects, Avatar, Character, Difficulty, FlappyAvatar, GameEvent, GameMode, GamePhase,
    GameState, Particle, ParticleKind, PowerUpKind, RunStats, RunnerAvatar, SessionOptions,
    TimeOfDay, Weather,
};
pub use tick::{Action, TickInput, apply_action, step, tick};
