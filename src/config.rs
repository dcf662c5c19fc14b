//! Engine configuration
//!
//! Parsed from the options object the host page passes to the game.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::state::{Character, Difficulty, GameMode, SessionOptions};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub character: Character,
    /// Fixed seed for reproducible sessions; random when absent
    pub seed: Option<u64>,
    pub settings: Settings,
}

impl EngineConfig {
    pub fn new(mode: GameMode, difficulty: Difficulty) -> Self {
        Self {
            mode,
            difficulty,
            ..Default::default()
        }
    }

    /// Parse from JSON. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }

    /// Options carried into every session of this engine
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            mode: self.mode,
            difficulty: self.difficulty,
            character: self.character,
            max_particles: self.settings.max_particles(),
        }
    }

    /// Seed for the first session
    pub fn initial_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;

    #[test]
    fn parses_host_options() {
        let config = EngineConfig::from_json(
            r#"{"mode":"flappy","difficulty":"hard","seed":99,"settings":{"quality":"low"}}"#,
        )
        .unwrap();
        assert_eq!(config.mode, GameMode::Flappy);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.initial_seed(), 99);
        assert_eq!(config.settings.quality, QualityPreset::Low);
        assert_eq!(
            config.session_options().max_particles,
            QualityPreset::Low.max_particles()
        );
    }

    #[test]
    fn empty_options_are_defaults() {
        let config = EngineConfig::from_json("  ").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.mode, GameMode::Runner);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(EngineConfig::from_json(r#"{"mode":"chess"}"#).is_err());
    }
}
