//! Data-driven game balance
//!
//! Every physics, spawning and scoring constant the simulation reads lives in
//! [`Tuning`], enumerated per mode and difficulty tier.

use serde::{Deserialize, Serialize};

use crate::sim::state::{Difficulty, GameMode};

/// Balance constants for one (mode, difficulty) pair. Units are per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    // === Avatar physics ===
    /// Downward acceleration (flappy: screen y grows down; runner: pulls jump height to 0)
    pub gravity: f32,
    /// Flap/jump impulse. Negative in flappy (up the screen), positive in runner (height)
    pub jump_velocity: f32,
    /// Terminal fall speed
    pub max_fall_speed: f32,
    pub tilt_smoothing: f32,
    pub lane_smoothing: f32,

    // === Speed progression ===
    pub base_speed: f32,
    pub max_speed: f32,
    /// Per-tick acceleration toward the current speed target
    pub speed_accel: f32,
    /// Speed target increase per milestone tier
    pub speed_step: f32,

    // === Spawn spacing ===
    pub base_gap: f32,
    pub gap_modifier: f32,
    /// Safety floor, gaps never shrink below this
    pub min_gap: f32,
    pub tightening_per_milestone: f32,
    pub max_tightening: f32,

    // === Scoring ===
    pub milestone_interval: u64,
    pub score_multiplier: f32,
    /// Passive score per unit of travel (runner)
    pub distance_score_rate: f32,

    // === Flappy pipes ===
    pub pipe_opening: f32,
    pub min_pipe_opening: f32,
    pub pipe_opening_step: f32,
    /// Chance a pipe opening carries a star
    pub star_chance: f32,

    // === Runner power-ups ===
    pub shield_ticks: u32,
    pub magnet_ticks: u32,
    pub boost_ticks: u32,
    /// Travel multiplier while boosting
    pub boost_factor: f32,
}

impl Tuning {
    pub fn new(mode: GameMode, difficulty: Difficulty) -> Self {
        match mode {
            GameMode::Flappy => Self::flappy(difficulty),
            GameMode::Runner => Self::runner(difficulty),
        }
    }

    fn flappy(difficulty: Difficulty) -> Self {
        let (base_speed, max_speed, gap_modifier, pipe_opening) = match difficulty {
            Difficulty::Easy => (2.2, 3.2, 1.2, 170.0),
            Difficulty::Normal => (2.6, 3.8, 1.0, 150.0),
            Difficulty::Hard => (3.0, 4.4, 0.85, 135.0),
        };
        Self {
            gravity: 0.25,
            jump_velocity: -4.6,
            max_fall_speed: 9.0,
            tilt_smoothing: 0.15,
            lane_smoothing: 0.0,
            base_speed,
            max_speed,
            speed_accel: 0.002,
            speed_step: 0.2,
            base_gap: 230.0,
            gap_modifier,
            min_gap: 150.0,
            tightening_per_milestone: 0.06,
            max_tightening: 0.30,
            milestone_interval: 10,
            score_multiplier: difficulty.score_multiplier(),
            distance_score_rate: 0.0,
            pipe_opening,
            min_pipe_opening: 115.0,
            pipe_opening_step: 4.0,
            star_chance: 0.25,
            shield_ticks: 0,
            magnet_ticks: 0,
            boost_ticks: 0,
            boost_factor: 1.0,
        }
    }

    fn runner(difficulty: Difficulty) -> Self {
        let (base_speed, max_speed, gap_modifier) = match difficulty {
            Difficulty::Easy => (6.0, 11.0, 1.25),
            Difficulty::Normal => (7.0, 14.0, 1.0),
            Difficulty::Hard => (8.0, 17.0, 0.8),
        };
        Self {
            gravity: 0.8,
            jump_velocity: 13.0,
            max_fall_speed: 30.0,
            tilt_smoothing: 0.2,
            lane_smoothing: 0.25,
            base_speed,
            max_speed,
            speed_accel: 0.004,
            speed_step: 0.8,
            base_gap: 420.0,
            gap_modifier,
            min_gap: 180.0,
            tightening_per_milestone: 0.06,
            max_tightening: 0.30,
            milestone_interval: 500,
            score_multiplier: difficulty.score_multiplier(),
            distance_score_rate: 0.05,
            pipe_opening: 0.0,
            min_pipe_opening: 0.0,
            pipe_opening_step: 0.0,
            star_chance: 0.0,
            shield_ticks: 600,
            magnet_ticks: 480,
            boost_ticks: 300,
            boost_factor: 1.5,
        }
    }

    /// Milestone tier reached at `score`
    #[inline]
    pub fn tier(&self, score: u64) -> u32 {
        (score / self.milestone_interval.max(1)).min(u32::MAX as u64) as u32
    }

    /// Fraction by which spawn gaps shrink at `score`, bounded by `max_tightening`
    pub fn tightening(&self, score: u64) -> f32 {
        (self.tier(score) as f32 * self.tightening_per_milestone).min(self.max_tightening)
    }

    /// Speed ceiling for the current tier, never above `max_speed`
    pub fn speed_target(&self, score: u64) -> f32 {
        (self.base_speed + self.tier(score) as f32 * self.speed_step).min(self.max_speed)
    }

    /// Flappy pipe opening at `score`
    pub fn pipe_opening_at(&self, score: u64) -> f32 {
        (self.pipe_opening - self.tier(score) as f32 * self.pipe_opening_step)
            .max(self.min_pipe_opening)
    }
}
