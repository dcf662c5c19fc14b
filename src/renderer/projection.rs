//! Pinhole projection for the runner scene
//!
//! `scale = near / (near + z)`; screen x grows with lateral x, screen y with
//! the drop from the camera. World y points down (negative = above the road).

use glam::Vec2;

use super::layout::Layout;
use crate::consts::{FAR_PLANE, NEAR_PLANE};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub pos: Vec2,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub near: f32,
    pub far: f32,
    pub center_x: f32,
    pub horizon_y: f32,
    pub camera_height: f32,
    /// Pixels per world unit at depth 0
    pub unit: f32,
}

impl Projection {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            near: NEAR_PLANE,
            far: FAR_PLANE,
            center_x: layout.center_x,
            horizon_y: layout.horizon_y,
            camera_height: layout.camera_height,
            unit: layout.unit,
        }
    }

    /// Project a world point. None when the point is at/behind the camera,
    /// beyond the far plane, or anything is non-finite.
    pub fn project(&self, x: f32, y: f32, z: f32) -> Option<Projected> {
        if !(x.is_finite() && y.is_finite() && z.is_finite()) {
            return None;
        }
        if z <= -self.near || z > self.far {
            return None;
        }
        let scale = self.near / (self.near + z);
        let pos = Vec2::new(
            self.center_x + x * self.unit * scale,
            self.horizon_y + (y + self.camera_height) * self.unit * scale,
        );
        (pos.is_finite() && scale.is_finite()).then_some(Projected { pos, scale })
    }

    /// Project a point `height` units above the road
    #[inline]
    pub fn project_above(&self, x: f32, height: f32, z: f32) -> Option<Projected> {
        self.project(x, -height, z)
    }
}
