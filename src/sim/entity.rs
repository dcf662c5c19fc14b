//! Obstacles, collectibles and power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;

/// Runner hazard heights (world units above the road)
pub const ROCK_HEIGHT: f32 = 35.0;
pub const CACTUS_HEIGHT: f32 = 55.0;
pub const BARRIER_HEIGHT: f32 = 150.0;
/// Height at which runner pickups float
pub const PICKUP_FLOAT_HEIGHT: f32 = 30.0;

/// Entity kind with only the state relevant to that kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Flappy pipe pair. `pos.x` is the left edge
    PipeSegment {
        gap_center: f32,
        gap_size: f32,
        /// Pass already credited
        scored: bool,
    },
    /// Low runner hazard, can be jumped
    Rock { cleared: bool },
    /// Tall runner hazard, can be jumped
    Cactus { cleared: bool },
    /// Lane blocker, cannot be jumped
    Barrier,
    Star,
    ShieldPickup,
    MagnetPickup,
    BoostPickup,
}

impl EntityKind {
    /// Height to beat when jumping over a runner hazard
    pub fn hazard_height(&self) -> Option<f32> {
        match self {
            EntityKind::Rock { .. } => Some(ROCK_HEIGHT),
            EntityKind::Cactus { .. } => Some(CACTUS_HEIGHT),
            EntityKind::Barrier => Some(BARRIER_HEIGHT),
            EntityKind::PipeSegment { .. }
            | EntityKind::Star
            | EntityKind::ShieldPickup
            | EntityKind::MagnetPickup
            | EntityKind::BoostPickup => None,
        }
    }

    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            EntityKind::PipeSegment { .. }
                | EntityKind::Rock { .. }
                | EntityKind::Cactus { .. }
                | EntityKind::Barrier
        )
    }

    pub fn power_up(&self) -> Option<PowerUpKind> {
        match self {
            EntityKind::ShieldPickup => Some(PowerUpKind::Shield),
            EntityKind::MagnetPickup => Some(PowerUpKind::Magnet),
            EntityKind::BoostPickup => Some(PowerUpKind::Boost),
            _ => None,
        }
    }

    pub fn pickup_for(kind: PowerUpKind) -> Self {
        match kind {
            PowerUpKind::Shield => EntityKind::ShieldPickup,
            PowerUpKind::Magnet => EntityKind::MagnetPickup,
            PowerUpKind::Boost => EntityKind::BoostPickup,
        }
    }
}

/// A spawned world entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Flappy: screen-space (x, y). Runner: (lateral x, depth z ahead of the avatar)
    pub pos: Vec2,
    pub active: bool,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            active: true,
        }
    }

    /// Runner depth
    #[inline]
    pub fn z(&self) -> f32 {
        self.pos.y
    }

    /// Runner lane this entity sits closest to
    #[inline]
    pub fn lane(&self) -> u8 {
        crate::nearest_lane(self.pos.x)
    }

    /// Flip the active flag off. Returns false if it was already inactive,
    /// so callers can gate one-shot effects on the result.
    pub fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivate_only_once() {
        let mut e = Entity::new(1, EntityKind::Star, Vec2::ZERO);
        assert!(e.deactivate());
        assert!(!e.deactivate());
        assert!(!e.active);
    }

    #[test]
    fn kinds_classify() {
        assert!(EntityKind::Barrier.is_hazard());
        assert!(!EntityKind::Star.is_hazard());
        assert_eq!(EntityKind::Star.hazard_height(), None);
        assert_eq!(
            EntityKind::BoostPickup.power_up(),
            Some(PowerUpKind::Boost)
        );
        assert_eq!(
            EntityKind::pickup_for(PowerUpKind::Magnet),
            EntityKind::MagnetPickup
        );
    }
}
