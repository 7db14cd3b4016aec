//! Player configuration for clarion-play
//!
//! Configuration is stored as YAML next to the mixer's own file.
//! Default location: ~/.config/clarion/player.yaml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use clarion_core::audio::AudioConfig;
use clarion_core::config::{default_config_dir, MixerConfig};

pub use clarion_core::config::{load_config, save_config};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Mixer settings (capacity, fade speed, volumes)
    pub mixer: MixerConfig,
    /// Output device settings
    pub audio: AudioConfig,
    /// Demo script settings
    pub demo: DemoConfig,
}

/// Demo script section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Total run time in seconds
    pub duration_secs: f32,
    /// Seconds between effect triggers
    pub effect_interval_secs: f32,
    /// Length of each synthesized music loop in seconds
    pub track_length_secs: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            duration_secs: 12.0,
            effect_interval_secs: 0.75,
            track_length_secs: 4.0,
        }
    }
}

/// Default player configuration path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("player.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "mixer:\n  fade_speed: 0.05\ndemo:\n  duration_secs: 3.0\n";
        let config: PlayerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.mixer.fade_speed, 0.05);
        assert_eq!(config.mixer.max_concurrent, 15);
        assert_eq!(config.demo.duration_secs, 3.0);
        assert_eq!(config.demo.track_length_secs, 4.0);
        assert_eq!(config.audio, AudioConfig::default());
    }

    #[test]
    fn test_config_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("player.yaml");

        let mut config = PlayerConfig::default();
        config.demo.effect_interval_secs = 0.25;
        save_config(&config, &path).unwrap();

        let loaded: PlayerConfig = load_config(&path);
        assert_eq!(loaded.demo.effect_interval_secs, 0.25);
        assert_eq!(loaded.mixer, config.mixer);
    }
}
