//! Avatar kinematics
//!
//! Gravity integration, flap/jump impulses, landing, and the exponential
//! smoothing used for tilt and lane glides.

use super::state::{FlappyAvatar, RunnerAvatar};
use crate::approach;
use crate::consts::*;
use crate::tuning::Tuning;

/// What happened to the bird during one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightContact {
    Airborne,
    /// Bird reached the ground (terminal while playing)
    Ground,
}

/// Flap: set upward velocity instantly, no hold-to-charge
pub fn flap(bird: &mut FlappyAvatar, tuning: &Tuning) {
    bird.vy = tuning.jump_velocity;
}

/// Advance the bird one tick
pub fn integrate_flappy(bird: &mut FlappyAvatar, tuning: &Tuning) -> FlightContact {
    bird.vy = (bird.vy + tuning.gravity).min(tuning.max_fall_speed);
    bird.y += bird.vy;

    // Ceiling: stop, don't die
    if bird.y < BIRD_RADIUS {
        bird.y = BIRD_RADIUS;
        bird.vy = bird.vy.max(0.0);
    }

    let target_tilt = (bird.vy * 0.12).clamp(-0.45, 1.3);
    bird.tilt = approach(bird.tilt, target_tilt, tuning.tilt_smoothing);
    bird.wing_phase += if bird.vy < 0.0 { 0.45 } else { 0.2 };

    if bird.y + BIRD_RADIUS >= FLAPPY_GROUND_Y {
        bird.y = FLAPPY_GROUND_Y - BIRD_RADIUS;
        bird.vy = 0.0;
        FlightContact::Ground
    } else {
        FlightContact::Airborne
    }
}

/// Menu idle: hover around the resting height
pub fn idle_flappy(bird: &mut FlappyAvatar, time_ticks: u64) {
    let t = time_ticks as f32 * 0.08;
    bird.y = FLAPPY_GROUND_Y * 0.45 + t.sin() * 8.0;
    bird.vy = 0.0;
    bird.tilt = approach(bird.tilt, 0.0, 0.2);
    bird.wing_phase += 0.25;
}

/// Start a jump if grounded. Returns true when the jump began.
pub fn try_jump(runner: &mut RunnerAvatar, tuning: &Tuning) -> bool {
    if !runner.is_grounded() {
        return false;
    }
    runner.jumping = true;
    runner.vy = tuning.jump_velocity;
    true
}

/// Move the target lane by `delta`, clamped to the road. Only while grounded.
/// Returns true if the target lane changed.
pub fn shift_lane(runner: &mut RunnerAvatar, delta: i8) -> bool {
    if !runner.is_grounded() {
        return false;
    }
    let max_lane = LANE_COUNT as i16 - 1;
    let next = (runner.lane as i16 + delta as i16).clamp(0, max_lane) as u8;
    if next == runner.lane {
        return false;
    }
    runner.lane = next;
    true
}

/// Advance the runner one tick; `travel` is the distance covered this tick.
/// Returns true on the tick the avatar lands.
pub fn integrate_runner(runner: &mut RunnerAvatar, tuning: &Tuning, travel: f32) -> bool {
    let mut landed = false;
    if runner.jumping {
        runner.height += runner.vy;
        runner.vy = (runner.vy - tuning.gravity).max(-tuning.max_fall_speed);
        if runner.height <= 0.0 {
            runner.height = 0.0;
            runner.vy = 0.0;
            runner.jumping = false;
            landed = true;
        }
    }

    let target_x = crate::lane_x(runner.lane);
    runner.x = approach(runner.x, target_x, tuning.lane_smoothing);
    let target_tilt = ((target_x - runner.x) * 0.006).clamp(-0.5, 0.5);
    runner.tilt = approach(runner.tilt, target_tilt, tuning.tilt_smoothing);
    runner.run_phase += travel * 0.05;

    landed
}

/// Menu idle: jog in place
pub fn idle_runner(runner: &mut RunnerAvatar) {
    runner.run_phase += 0.15;
    runner.tilt = approach(runner.tilt, 0.0, 0.2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, GameMode};

    fn runner_tuning() -> Tuning {
        Tuning::new(GameMode::Runner, Difficulty::Normal)
    }

    #[test]
    fn gravity_pulls_bird_down() {
        let t = Tuning::new(GameMode::Flappy, Difficulty::Normal);
        let mut bird = FlappyAvatar::default();
        let y0 = bird.y;
        integrate_flappy(&mut bird, &t);
        assert!((bird.vy - t.gravity).abs() < 1e-6);
        assert!(bird.y > y0);
    }

    #[test]
    fn flap_is_instant_impulse() {
        let t = Tuning::new(GameMode::Flappy, Difficulty::Normal);
        let mut bird = FlappyAvatar::default();
        bird.vy = 6.0;
        flap(&mut bird, &t);
        assert_eq!(bird.vy, t.jump_velocity);
    }

    #[test]
    fn bird_hits_ground() {
        let t = Tuning::new(GameMode::Flappy, Difficulty::Normal);
        let mut bird = FlappyAvatar::default();
        let mut contact = FlightContact::Airborne;
        for _ in 0..600 {
            contact = integrate_flappy(&mut bird, &t);
            if contact == FlightContact::Ground {
                break;
            }
        }
        assert_eq!(contact, FlightContact::Ground);
    }

    #[test]
    fn ceiling_clamps() {
        let t = Tuning::new(GameMode::Flappy, Difficulty::Normal);
        let mut bird = FlappyAvatar {
            y: BIRD_RADIUS + 1.0,
            vy: -8.0,
            ..Default::default()
        };
        integrate_flappy(&mut bird, &t);
        assert_eq!(bird.y, BIRD_RADIUS);
        assert!(bird.vy >= 0.0);
    }

    #[test]
    fn jump_only_when_grounded() {
        let t = runner_tuning();
        let mut r = RunnerAvatar::default();
        assert!(try_jump(&mut r, &t));
        assert!(!try_jump(&mut r, &t));
        assert_eq!(r.vy, t.jump_velocity);
    }

    #[test]
    fn jump_lands_and_clears_flag() {
        let t = runner_tuning();
        let mut r = RunnerAvatar::default();
        try_jump(&mut r, &t);
        let mut landed = false;
        let mut apex: f32 = 0.0;
        for _ in 0..100 {
            landed = integrate_runner(&mut r, &t, 7.0);
            apex = apex.max(r.height);
            if landed {
                break;
            }
        }
        assert!(landed);
        assert!(!r.jumping);
        assert_eq!(r.height, 0.0);
        assert_eq!(r.vy, 0.0);
        assert!(apex > crate::sim::entity::CACTUS_HEIGHT);
        assert!(apex < crate::sim::entity::BARRIER_HEIGHT);
    }

    #[test]
    fn lane_shift_clamps() {
        let mut r = RunnerAvatar::default();
        assert!(shift_lane(&mut r, -1));
        assert!(!shift_lane(&mut r, -1));
        assert_eq!(r.lane, 0);
        assert!(shift_lane(&mut r, 1));
        assert!(shift_lane(&mut r, 1));
        assert!(!shift_lane(&mut r, 1));
        assert_eq!(r.lane, LANE_COUNT - 1);
    }

    #[test]
    fn lane_shift_blocked_airborne() {
        let t = runner_tuning();
        let mut r = RunnerAvatar::default();
        try_jump(&mut r, &t);
        assert!(!shift_lane(&mut r, 1));
        assert_eq!(r.lane, 1);
    }

    #[test]
    fn lateral_glide_is_smoothed() {
        let t = runner_tuning();
        let mut r = RunnerAvatar::default();
        shift_lane(&mut r, 1);
        integrate_runner(&mut r, &t, 7.0);
        assert!(r.x > 0.0 && r.x < crate::lane_x(2));
        for _ in 0..60 {
            integrate_runner(&mut r, &t, 7.0);
        }
        assert!((r.x - crate::lane_x(2)).abs() < 0.5);
    }
}
