//! Common types for Clarion
//!
//! Fundamental audio types shared by the sources, the mixer and the device
//! backend: the sample type, the stereo frame and the channel layout of a
//! source.

use serde::{Deserialize, Serialize};

/// Canonical sample rate of the mixer (48kHz)
///
/// Every source handed to the mixer must already be at this rate; the import
/// pipeline is responsible for resampling.
pub const SAMPLE_RATE: u32 = 48000;

/// Number of interleaved channels in the output buffer
pub const OUTPUT_CHANNELS: usize = 2;

/// Audio sample type (32-bit float, normalized to [-1, 1])
pub type Sample = f32;

/// Channel layout of a decoded source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Channels {
    #[default]
    Mono = 1,
    Stereo = 2,
}

impl Channels {
    /// Convert from a raw channel count
    pub fn from_count(count: u16) -> Option<Self> {
        match count {
            1 => Some(Channels::Mono),
            2 => Some(Channels::Stereo),
            _ => None,
        }
    }

    /// Number of interleaved channels
    #[inline]
    pub fn count(&self) -> usize {
        *self as usize
    }
}

/// Duration in seconds of `sample_count` interleaved samples
pub fn duration_secs(sample_count: u64, channels: Channels, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    ((sample_count / channels.count() as u64) as f64 / sample_rate as f64) as f32
}

/// A single output frame (left and right channels)
///
/// Uses `#[repr(C)]` so that `&mut [StereoSample]` and an interleaved
/// `&mut [f32]` share a layout; the mixer writes straight into the host's
/// buffer through a bytemuck cast.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a silent stereo sample
    #[inline]
    pub fn silence() -> Self {
        Self::default()
    }

    /// Get the peak amplitude (max of abs(left), abs(right))
    #[inline]
    pub fn peak(&self) -> Sample {
        self.left.abs().max(self.right.abs())
    }
}

/// View an interleaved stereo buffer as frames
///
/// Returns the whole frames and any trailing half-frame (at most one sample)
/// left over when the buffer length is odd.
pub fn split_frames(interleaved: &mut [Sample]) -> (&mut [StereoSample], &mut [Sample]) {
    let whole = interleaved.len() - interleaved.len() % OUTPUT_CHANNELS;
    let (frames, tail) = interleaved.split_at_mut(whole);
    (bytemuck::cast_slice_mut(frames), tail)
}
