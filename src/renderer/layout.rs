//! Pixel layout derived from the surface size
//!
//! Recomputed as a whole at the start of a frame after a resize, never mid-frame.

use glam::Vec2;

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    /// Flappy world → pixel scale (letterboxed, aspect kept)
    pub world_scale: f32,
    /// Pixel offset of the flappy world origin
    pub world_origin: Vec2,
    /// Runner horizon line
    pub horizon_y: f32,
    pub center_x: f32,
    /// Pixels per runner world unit at depth 0
    pub unit: f32,
    /// Camera height above the road (world units)
    pub camera_height: f32,
    /// Lane width in pixels at depth 0
    pub lane_width: f32,
}

impl Layout {
    pub fn new(width: f32, height: f32) -> Self {
        let width = if width.is_finite() { width.max(1.0) } else { 1.0 };
        let height = if height.is_finite() { height.max(1.0) } else { 1.0 };

        let world_scale = (width / FLAPPY_WORLD_WIDTH).min(height / FLAPPY_WORLD_HEIGHT);
        let world_origin = Vec2::new(
            (width - FLAPPY_WORLD_WIDTH * world_scale) / 2.0,
            (height - FLAPPY_WORLD_HEIGHT * world_scale) / 2.0,
        );

        // Road spans ~80% of the narrower axis at the avatar's depth
        let road_world = LANE_SPACING * LANE_COUNT as f32;
        let unit = (width.min(height * 0.9) * 0.8) / road_world;
        let horizon_y = height * 0.36;
        // Avatar feet sit at ~82% of the height
        let camera_height = (height * 0.82 - horizon_y) / unit;

        Self {
            width,
            height,
            world_scale,
            world_origin,
            horizon_y,
            center_x: width / 2.0,
            unit,
            camera_height,
            lane_width: LANE_SPACING * unit,
        }
    }

    /// Flappy world point → pixels
    #[inline]
    pub fn world_to_px(&self, x: f32, y: f32) -> Vec2 {
        self.world_origin + Vec2::new(x, y) * self.world_scale
    }

    #[inline]
    pub fn px(&self, world_len: f32) -> f32 {
        world_len * self.world_scale
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(FLAPPY_WORLD_WIDTH, FLAPPY_WORLD_HEIGHT)
    }
}
