//! Host audio output for Clarion
//!
//! The mixer only needs a callback invoked periodically with an interleaved
//! `f32` buffer; this module provides that callback on top of CPAL.
//!
//! # Architecture
//!
//! - **Game thread**: sends commands via a lock-free ringbuffer, writes
//!   volumes to relaxed atomics
//! - **Audio thread**: owns the [`MixerProcessor`](crate::engine::MixerProcessor)
//!   exclusively and applies commands at the start of each period
//!
//! # Example Usage
//!
//! ```ignore
//! use clarion_core::audio::{start_output, AudioConfig};
//!
//! let handle = start_output(&AudioConfig::default(), processor)?;
//! log::info!("Latency: {:.1}ms", handle.latency_ms());
//! // Dropping the handle stops the callback
//! ```

mod config;
mod cpal_backend;
mod device;
mod error;

pub use config::{
    AudioConfig, BufferSize, DeviceId, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE,
};
pub use cpal_backend::{start_output, AudioHandle};
pub use device::{default_output_device, find_device_by_id, output_devices, AudioDevice};
pub use error::{AudioError, AudioResult};
