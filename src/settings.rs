//! Presentation and audio preferences
//!
//! Supplied by the host page as part of the options JSON. Nothing is persisted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rendering detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(format!("unknown quality preset '{other}'")),
        }
    }
}

impl QualityPreset {
    /// Cosmetic particle cap
    pub fn max_particles(self) -> usize {
        match self {
            QualityPreset::Low => 48,
            QualityPreset::Medium => 160,
            QualityPreset::High => 400,
        }
    }

    /// Parallax clouds and roadside scenery
    pub fn scenery_enabled(self) -> bool {
        self != QualityPreset::Low
    }

    /// Rain/snow overlays
    pub fn weather_enabled(self) -> bool {
        self == QualityPreset::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,
    /// Camera shake on crashes
    pub screen_shake: bool,
    /// Dust, sparkles, debris
    pub particles: bool,
    /// 0.0 - 1.0
    pub master_volume: f32,
    /// 0.0 - 1.0, applied on top of the master volume
    pub sfx_volume: f32,
    pub muted: bool,
    /// Turns off shake and weather regardless of the other switches
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Defaults for a preset. Low also turns shake off.
    pub fn from_preset(quality: QualityPreset) -> Self {
        Self {
            quality,
            screen_shake: quality != QualityPreset::Low,
            ..Self::default()
        }
    }

    /// Missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn effective_weather(&self) -> bool {
        self.quality.weather_enabled() && !self.reduced_motion
    }

    /// Particle cap after the particles switch (0 = none)
    pub fn max_particles(&self) -> usize {
        if self.particles {
            self.quality.max_particles()
        } else {
            0
        }
    }
}
