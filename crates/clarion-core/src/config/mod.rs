//! Configuration for the mixer and the output device
//!
//! Configuration is stored as YAML. Every section uses `#[serde(default)]`,
//! so a partial file only overrides the keys it names.
//!
//! # Usage
//!
//! ```ignore
//! use clarion_core::config::{default_config_path, load_config, save_config, MixerConfig};
//!
//! let path = default_config_path();
//! let config: MixerConfig = load_config(&path);
//! save_config(&config.sanitized(), &path)?;
//! ```

mod io;
mod mixer;
mod paths;

pub use io::{load_config, save_config};
pub use mixer::{
    MixerConfig, DEFAULT_FADE_SPEED, DEFAULT_MAX_CONCURRENT, DEFAULT_TRACK_DISTANCE_SECS,
};
pub use paths::{default_config_dir, default_config_path, CONFIG_FILE_NAME};
