//! Device backend error types

use thiserror::Error;

/// Errors that can occur while opening the output device
///
/// Once a stream is running nothing in the engine fails; these are all
/// initialization failures and are fatal to the audio subsystem.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio devices available
    #[error("No audio output devices found")]
    NoDevices,

    /// Failed to get default device
    #[error("Failed to get default audio device: {0}")]
    NoDefaultDevice(String),

    /// Device not found
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to get device configuration
    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    /// Failed to start/play stream
    #[error("Failed to start audio stream: {0}")]
    StreamPlayError(String),

    /// The device offers no 32-bit float output
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for device operations
pub type AudioResult<T> = Result<T, AudioError>;
