//! YAML load/save for any configuration type

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Load configuration from a YAML file
///
/// A missing file is not an error: the defaults are returned. A file that
/// cannot be read or parsed is logged and also falls back to the defaults,
/// so a broken config never keeps the game from starting.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No config at {:?}, using defaults", path);
            return T::default();
        }
        Err(e) => {
            log::warn!("Failed to read config {:?}: {}, using defaults", path, e);
            return T::default();
        }
    };

    // An empty file deserializes to YAML null, which a struct rejects
    if contents.trim().is_empty() {
        log::info!("Config {:?} is empty, using defaults", path);
        return T::default();
    }

    match serde_yaml::from_str::<T>(&contents) {
        Ok(config) => {
            log::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Failed to parse config {:?}: {}, using defaults", path, e);
            T::default()
        }
    }
}

/// Save configuration to a YAML file, creating parent directories
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write config {:?}", path))?;

    log::info!("Saved config to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MixerConfig;
    use crate::group::SoundGroup;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config: MixerConfig = load_config(&dir.path().join("absent.yaml"));
        assert_eq!(config, MixerConfig::default());
    }

    #[test]
    fn test_roundtrip_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clarion.yaml");

        let mut config = MixerConfig::default();
        config.max_concurrent = 8;
        config.music_volume = 0.6;
        config.group_volumes.insert(SoundGroup::Voice, 0.9);

        save_config(&config, &path).unwrap();
        let loaded: MixerConfig = load_config(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clarion.yaml");
        std::fs::write(&path, "fade_speed: 0.05\n").unwrap();

        let config: MixerConfig = load_config(&path);
        assert_eq!(config.fade_speed, 0.05);
        assert_eq!(config.max_concurrent, MixerConfig::default().max_concurrent);
    }

    #[test]
    fn test_invalid_or_empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clarion.yaml");

        std::fs::write(&path, "max_concurrent: [not, a, number]\n").unwrap();
        let config: MixerConfig = load_config(&path);
        assert_eq!(config, MixerConfig::default());

        std::fs::write(&path, "  \n").unwrap();
        let config: MixerConfig = load_config(&path);
        assert_eq!(config, MixerConfig::default());
    }
}
