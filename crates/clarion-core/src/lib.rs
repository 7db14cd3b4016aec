//! Clarion Core - Real-time music and sound-effect mixer for game runtimes

pub mod audio;
pub mod config;
pub mod engine;
pub mod group;
pub mod instance;
pub mod manager;
pub mod playlist;
pub mod render;
pub mod source;
pub mod types;
pub mod volume;

pub use group::{GroupVolumes, SoundGroup};
pub use instance::{EffectInstance, InstanceId, MusicTrack, SoundEffect};
pub use manager::AudioManager;
pub use playlist::Playlist;
pub use source::{EffectSource, MusicSource, SourceError};
pub use types::*;
