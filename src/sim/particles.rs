//! Cosmetic particle bursts
//!
//! Particles use hash-derived jitter instead of the session RNG so that the
//! particle cap never changes what the spawner generates.

use glam::Vec2;

use super::state::{GameMode, GameState, Particle, ParticleKind};

pub const COLOR_DUST: u32 = 0xd8c8a0;
pub const COLOR_STAR: u32 = 0xffd84a;
pub const COLOR_SHIELD: u32 = 0x5ac8ff;
pub const COLOR_MAGNET: u32 = 0xff5a7a;
pub const COLOR_BOOST: u32 = 0xffa030;
pub const COLOR_DEBRIS: u32 = 0x8a6a4a;
pub const COLOR_CRASH: u32 = 0xff4040;

/// Deterministic jitter in [0, 1)
fn jitter(seed: u32, i: u32, salt: u32) -> f32 {
    let hash = seed
        .wrapping_mul(7919)
        .wrapping_add(i.wrapping_mul(104729))
        .wrapping_add(salt.wrapping_mul(2654435761));
    let hash = hash ^ (hash >> 15);
    (hash % 1000) as f32 / 1000.0
}

/// Emit `count` particles of one kind around `pos`
pub fn burst(
    state: &mut GameState,
    kind: ParticleKind,
    pos: Vec2,
    height: f32,
    count: u32,
    color: u32,
) {
    let cap = state.options.max_particles;
    let seed = (state.time_ticks as u32) ^ state.session_id.wrapping_mul(31);
    let speed = match kind {
        ParticleKind::Shockwave | ParticleKind::Glow => 0.0,
        ParticleKind::Debris => 4.0,
        ParticleKind::Sparkle => 3.0,
        ParticleKind::Dust | ParticleKind::Trail => 1.5,
    };

    for i in 0..count {
        if state.particles.len() >= cap {
            break;
        }
        let angle = jitter(seed, i, 1) * std::f32::consts::TAU;
        let magnitude = speed * (0.5 + jitter(seed, i, 2));
        state.particles.push(Particle {
            kind,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * magnitude,
            height,
            life: 1.0,
            color,
            rotation: angle,
            size: 2.0 + jitter(seed, i, 3) * 3.0,
        });
    }
}

/// Age and move particles; `travel` scrolls runner particles with the road
pub fn update(state: &mut GameState, travel: f32) {
    let mode = state.mode();
    for p in state.particles.iter_mut() {
        let decay = match p.kind {
            ParticleKind::Shockwave => 0.05,
            ParticleKind::Trail => 0.08,
            ParticleKind::Dust => 0.04,
            ParticleKind::Sparkle => 0.03,
            ParticleKind::Debris => 0.025,
            ParticleKind::Glow => 0.02,
        };
        p.life -= decay;
        p.rotation += 0.1;
        if p.kind == ParticleKind::Shockwave {
            p.size += 3.0;
        }

        match mode {
            GameMode::Flappy => {
                p.pos += p.vel;
                if p.kind == ParticleKind::Debris {
                    p.vel.y += 0.2;
                }
                p.pos.x -= travel;
            }
            GameMode::Runner => {
                // vel = (lateral, vertical); depth follows the road
                p.pos.x += p.vel.x;
                p.height = (p.height + p.vel.y).max(0.0);
                if p.kind == ParticleKind::Debris {
                    p.vel.y -= 0.3;
                }
                p.pos.y -= travel;
            }
        }
        p.vel *= 0.96;
    }
    state.particles.retain(|p| p.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SessionOptions;

    #[test]
    fn particles_respect_cap() {
        let options = SessionOptions {
            max_particles: 10,
            ..Default::default()
        };
        let mut state = GameState::new(options, 1);
        burst(&mut state, ParticleKind::Sparkle, Vec2::ZERO, 0.0, 50, COLOR_STAR);
        assert_eq!(state.particles.len(), 10);
    }

    #[test]
    fn particles_decay_away() {
        let mut state = GameState::new(SessionOptions::default(), 1);
        burst(&mut state, ParticleKind::Glow, Vec2::ZERO, 0.0, 5, COLOR_STAR);
        for _ in 0..60 {
            update(&mut state, 1.0);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn bursts_do_not_touch_session_rng() {
        use rand::Rng;
        let mut a = GameState::new(SessionOptions::default(), 42);
        let mut b = GameState::new(SessionOptions::default(), 42);
        burst(&mut a, ParticleKind::Debris, Vec2::ZERO, 0.0, 20, COLOR_DEBRIS);
        assert_eq!(a.rng.random::<u32>(), b.rng.random::<u32>());
    }
}
