//! Lock-free volume storage shared between the control and audio threads
//!
//! Volumes are plain `f32` values stored as bits in an `AtomicU32`. All
//! accesses are `Relaxed`: the audio thread may observe a new value one
//! callback late, which is acceptable for gain changes (a single-period
//! glitch at worst, never a stall).

use std::sync::atomic::{AtomicU32, Ordering};

/// Clamp a volume to the [0, 1] range
///
/// NaN maps to silence.
#[inline]
pub fn clamp_volume(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// An `f32` volume in [0, 1], readable and writable from any thread
#[derive(Debug)]
pub struct AtomicVolume {
    bits: AtomicU32,
}

impl AtomicVolume {
    /// Create a volume, clamping the initial value
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(clamp_volume(value).to_bits()),
        }
    }

    /// Current volume (lock-free)
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Set the volume; out-of-range input is clamped, never rejected
    #[inline]
    pub fn set(&self, value: f32) {
        self.bits.store(clamp_volume(value).to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicVolume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
