//! Party Arcade - embeddable mini-games for the party site
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `renderer`: 2D canvas rendering (side-scroller and pseudo-3D runner)
//! - `engine`: Game-loop driver wiring sim, renderer, audio and host callbacks
//! - `platform`: Browser bindings
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod config;
pub mod engine;
pub mod highscores;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use config::EngineConfig;
pub use engine::{GameEngine, HostCallbacks, HudSnapshot};
pub use highscores::SessionScores;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, physics constants are per tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Longest frame delta accepted by the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Flappy logical world dimensions
    pub const FLAPPY_WORLD_WIDTH: f32 = 400.0;
    pub const FLAPPY_WORLD_HEIGHT: f32 = 600.0;
    pub const FLAPPY_GROUND_Y: f32 = 540.0;
    pub const BIRD_X: f32 = 110.0;
    pub const BIRD_RADIUS: f32 = 14.0;
    /// Half extent of the bird's collision square (smaller than the sprite)
    pub const BIRD_HITBOX_HALF: f32 = 10.0;
    pub const PIPE_WIDTH: f32 = 64.0;

    /// Runner lanes
    pub const LANE_COUNT: u8 = 3;
    /// Lateral world distance between lane centers
    pub const LANE_SPACING: f32 = 100.0;
    /// Depth at which runner entities appear
    pub const SPAWN_DEPTH: f32 = 1400.0;
    /// Entities behind the avatar by more than this are culled
    pub const DESPAWN_DEPTH: f32 = -120.0;
    /// Projection planes (world depth units)
    pub const NEAR_PLANE: f32 = 160.0;
    pub const FAR_PLANE: f32 = 1600.0;

    /// Combo window in ticks
    pub const COMBO_WINDOW_TICKS: u32 = 120;
    pub const MAX_COMBO_MULTIPLIER: f32 = 3.0;
}

/// World-space lateral position of a runner lane center
#[inline]
pub fn lane_x(lane: u8) -> f32 {
    (lane as f32 - (consts::LANE_COUNT as f32 - 1.0) / 2.0) * consts::LANE_SPACING
}

/// Nearest lane to a lateral world position
#[inline]
pub fn nearest_lane(x: f32) -> u8 {
    let half = (consts::LANE_COUNT as f32 - 1.0) / 2.0;
    let lane = (x / consts::LANE_SPACING + half).round();
    lane.clamp(0.0, consts::LANE_COUNT as f32 - 1.0) as u8
}

/// Exponential smoothing step: move `current` a fraction of the way to `target`
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_are_centered() {
        assert_eq!(lane_x(0), -100.0);
        assert_eq!(lane_x(1), 0.0);
        assert_eq!(lane_x(2), 100.0);
        assert_eq!(nearest_lane(-140.0), 0);
        assert_eq!(nearest_lane(49.0), 1);
        assert_eq!(nearest_lane(500.0), 2);
    }

    #[test]
    fn approach_converges() {
        let mut x = 0.0;
        for _ in 0..100 {
            x = approach(x, 10.0, 0.25);
        }
        assert!((x - 10.0).abs() < 1e-3);
    }
}
