//! Audio engine - Mixer, crossfade and the queues around it
//!
//! This module contains the real-time half of Clarion:
//! - Mixer: owns the active effects and music slots, fills output buffers
//! - Crossfade: per-callback music fade state machine
//! - Command/event queues between the control thread and the audio thread
//! - MixerParams: lock-free volumes and state mirrors

mod command;
mod crossfade;
mod event;
mod mixer;
mod params;
mod summing;

pub use command::*;
pub use crossfade::*;
pub use event::*;
pub use mixer::*;
pub use params::*;
pub use summing::*;
