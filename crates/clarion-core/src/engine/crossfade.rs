//! Music crossfade state machine
//!
//! One multiplier scales the current music track. While a different track is
//! pending it ramps down; once it reaches 0 the mixer commits the switch and
//! the multiplier ramps back up for the new track. The ramp advances one step
//! per audio callback, not per sample, so a 4096-frame period at 48 kHz with
//! the default step of 0.01 fades out over roughly 8.5 seconds in audible
//! discrete steps.

/// Smallest accepted step; anything slower would take longer than a session
pub const MIN_FADE_SPEED: f64 = 1e-4;

/// Distance from either ramp end that counts as having reached it
///
/// A step like 0.01 arrives as an `f32` slightly below its decimal value and
/// repeated subtraction drifts further; snapping keeps the fade at exactly
/// `ceil(1 / step)` invocations. It stays well below [`MIN_FADE_SPEED`].
const SNAP_TOLERANCE: f64 = 1e-6;

/// Crossfade multiplier with a fixed per-invocation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    multiplier: f64,
    step: f64,
}

impl Crossfade {
    /// Create a crossfade at full level
    ///
    /// The step is taken as an absolute value and bounded to
    /// [`MIN_FADE_SPEED`, 1]. Non-finite input falls back to the minimum.
    pub fn new(fade_speed: f32) -> Self {
        let step = f64::from(fade_speed).abs();
        let step = if step.is_finite() {
            step.clamp(MIN_FADE_SPEED, 1.0)
        } else {
            MIN_FADE_SPEED
        };
        Self {
            multiplier: 1.0,
            step,
        }
    }

    /// Per-invocation step
    pub fn step_size(&self) -> f64 {
        self.step
    }

    /// Current multiplier in [0, 1]
    #[inline]
    pub fn multiplier(&self) -> f32 {
        self.multiplier as f32
    }

    /// Whether the current track is fully faded out
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.multiplier <= 0.0
    }

    /// Whether the multiplier sits at full level
    pub fn is_full(&self) -> bool {
        self.multiplier >= 1.0
    }

    /// Number of invocations a full ramp takes in either direction
    pub fn invocations_for_full_fade(&self) -> u32 {
        ((1.0 - SNAP_TOLERANCE) / self.step).ceil() as u32
    }

    /// Advance one audio period
    ///
    /// `switching` is true when the pending track differs from the current
    /// one. A switch held by pause neither falls nor rises.
    pub fn step(&mut self, switching: bool, paused: bool) {
        if switching {
            if !paused {
                let next = self.multiplier - self.step;
                self.multiplier = if next <= SNAP_TOLERANCE { 0.0 } else { next };
            }
        } else if self.multiplier < 1.0 {
            let next = self.multiplier + self.step;
            self.multiplier = if next >= 1.0 - SNAP_TOLERANCE { 1.0 } else { next };
        }
    }

    /// Jump straight to a level (used when music starts from silence)
    pub fn reset(&mut self, multiplier: f32) {
        self.multiplier = f64::from(multiplier).clamp(0.0, 1.0);
    }
}

impl Default for Crossfade {
    fn default() -> Self {
        Self::new(0.01)
    }
}
