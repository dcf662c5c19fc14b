//! Canvas rendering module
//!
//! Both scenes redraw everything each frame through the [`Surface`] trait.
//! The browser backend lives in `canvas`; tests use [`RecordingSurface`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod flappy;
pub mod layout;
pub mod projection;
pub mod runner;
pub mod surface;

use glam::Vec2;

pub use layout::Layout;
pub use projection::{Projected, Projection};
pub use surface::{Color, DrawCall, GuardedSurface, RecordingSurface, Surface, TextAlign};

use crate::settings::Settings;
use crate::sim::state::{GameMode, GameState};

/// Per-frame presentation knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Parallax clouds, roadside trees and lamps
    pub scenery: bool,
    /// Rain/snow overlay
    pub weather: bool,
    /// Camera shake offset in pixels
    pub shake: Vec2,
    /// Session best shown in the HUD
    pub best: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scenery: true,
            weather: false,
            shake: Vec2::ZERO,
            best: 0,
        }
    }
}

impl RenderOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            scenery: settings.quality.scenery_enabled(),
            weather: settings.effective_weather(),
            ..Default::default()
        }
    }
}

/// Draw the scene for the state's mode
pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    state: &GameState,
    layout: &Layout,
    options: &RenderOptions,
) {
    match state.mode() {
        GameMode::Flappy => flappy::draw(surface, state, layout, options),
        GameMode::Runner => runner::draw(surface, state, layout, options),
    }
}
