//! Output device configuration
//!
//! Device selection, buffer size and sample rate requested from the host.
//! The mixer itself never sees these: it fills whatever buffer the device
//! hands it.

use serde::{Deserialize, Serialize};

use crate::types::SAMPLE_RATE;

/// Largest period accepted from the configuration (frames)
pub const MAX_BUFFER_SIZE: u32 = 16384;

/// Smallest period accepted from the configuration (frames)
pub const MIN_BUFFER_SIZE: u32 = 64;

/// Default period (frames)
///
/// The crossfade advances once per period, so this also sets the fade
/// granularity: 4096 frames at 48kHz is ~85ms per step.
pub const DEFAULT_BUFFER_SIZE: u32 = 4096;

/// Requested buffer size for the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BufferSize {
    /// Use [`DEFAULT_BUFFER_SIZE`]
    #[default]
    Default,
    /// Request a specific buffer size in frames (clamped to the accepted range)
    Fixed(u32),
}

impl BufferSize {
    /// Period in frames that will be requested from the device
    pub fn frames(&self) -> u32 {
        match self {
            BufferSize::Default => DEFAULT_BUFFER_SIZE,
            BufferSize::Fixed(frames) => (*frames).clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE),
        }
    }

    /// Latency of one period in milliseconds
    pub fn latency_ms(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        (self.frames() as f32 / sample_rate as f32) * 1000.0
    }
}

/// Audio device identifier
///
/// Includes both the device name and the host backend (ALSA, CoreAudio,
/// WASAPI, ...) so the same name can be told apart across hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    /// Device name as reported by the system
    pub name: String,
    /// Audio host identifier; `None` searches every host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl DeviceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: None,
        }
    }

    pub fn with_host(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: Some(host.into()),
        }
    }

    /// Display label including the host when known
    pub fn display_label(&self) -> String {
        match &self.host {
            Some(host) => format!("[{}] {}", host, self.name),
            None => self.name.clone(),
        }
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_label())
    }
}

/// Configuration for the output device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output device (None = system default)
    pub device: Option<DeviceId>,

    /// Requested period size
    pub buffer_size: BufferSize,

    /// Requested sample rate; should match the mixer's canonical rate since
    /// the engine does not resample
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            buffer_size: BufferSize::default(),
            sample_rate: SAMPLE_RATE,
        }
    }
}

impl AudioConfig {
    /// Select an output device
    pub fn with_device(mut self, device: DeviceId) -> Self {
        self.device = Some(device);
        self
    }

    /// Request a fixed period size
    pub fn with_buffer_size(mut self, frames: u32) -> Self {
        self.buffer_size = BufferSize::Fixed(frames);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_frames() {
        assert_eq!(BufferSize::Default.frames(), 4096);
        assert_eq!(BufferSize::Fixed(1024).frames(), 1024);
        assert_eq!(BufferSize::Fixed(1).frames(), MIN_BUFFER_SIZE);
        assert_eq!(BufferSize::Fixed(1 << 20).frames(), MAX_BUFFER_SIZE);
    }

    #[test]
    fn test_latency() {
        assert_eq!(BufferSize::Fixed(480).latency_ms(48000), 10.0);
        assert_eq!(BufferSize::Default.latency_ms(0), 0.0);
    }

    #[test]
    fn test_device_label() {
        assert_eq!(DeviceId::new("hw:0").display_label(), "hw:0");
        assert_eq!(DeviceId::with_host("hw:0", "ALSA").to_string(), "[ALSA] hw:0");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = AudioConfig::default()
            .with_device(DeviceId::with_host("Speakers", "CoreAudio"))
            .with_buffer_size(512);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: AudioConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(loaded, config);
    }
}
