//! Lock-free mixer parameters and state mirrors
//!
//! The control thread writes volumes and the pause flag; the audio thread
//! reads them once per callback. In the other direction the audio thread
//! publishes a few read-only mirrors (fade multiplier, active effect count,
//! dropped events) so the game can display them without a lock.
//!
//! All operations use `Ordering::Relaxed` since we only need visibility,
//! not synchronization with other memory operations. A torn or late read of
//! a volume costs at most one period of the old gain.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

use crate::config::MixerConfig;
use crate::group::{GroupVolumes, SoundGroup};
use crate::volume::AtomicVolume;

/// Shared mixer state, wrapped in an `Arc` by both threads
#[derive(Debug)]
pub struct MixerParams {
    master_volume: AtomicVolume,
    music_volume: AtomicVolume,
    pause_music: AtomicBool,
    groups: GroupVolumes,

    /// Mirror of the crossfade multiplier (f32 bits)
    fade_multiplier: AtomicU32,
    /// Mirror of the active effect count
    active_effects: AtomicUsize,
    /// Events lost because the event queue was full
    dropped_events: AtomicU64,
}

impl MixerParams {
    /// Create parameters with every volume at full
    pub fn new() -> Self {
        Self {
            master_volume: AtomicVolume::new(1.0),
            music_volume: AtomicVolume::new(1.0),
            pause_music: AtomicBool::new(false),
            groups: GroupVolumes::new(),
            fade_multiplier: AtomicU32::new(1.0_f32.to_bits()),
            active_effects: AtomicUsize::new(0),
            dropped_events: AtomicU64::new(0),
        }
    }

    /// Create parameters seeded from a configuration
    pub fn from_config(config: &MixerConfig) -> Self {
        let params = Self::new();
        params.set_master_volume(config.master_volume);
        params.set_music_volume(config.music_volume);
        for group in SoundGroup::ALL {
            params.groups.set(group, config.group_volume(group));
        }
        params
    }

    /// Master volume applied to everything (0.0 to 1.0)
    #[inline]
    pub fn master_volume(&self) -> f32 {
        self.master_volume.get()
    }

    /// Set master volume (clamped to [0, 1])
    pub fn set_master_volume(&self, volume: f32) {
        self.master_volume.set(volume);
    }

    /// Music volume (0.0 to 1.0)
    #[inline]
    pub fn music_volume(&self) -> f32 {
        self.music_volume.get()
    }

    /// Set music volume (clamped to [0, 1])
    pub fn set_music_volume(&self, volume: f32) {
        self.music_volume.set(volume);
    }

    /// Whether music is paused
    #[inline]
    pub fn music_paused(&self) -> bool {
        self.pause_music.load(Ordering::Relaxed)
    }

    /// Pause or resume music
    ///
    /// While paused the stream does not advance and a pending crossfade is
    /// held where it is.
    pub fn set_music_paused(&self, paused: bool) {
        self.pause_music.store(paused, Ordering::Relaxed);
    }

    /// Per-group volume table
    #[inline]
    pub fn groups(&self) -> &GroupVolumes {
        &self.groups
    }

    /// Current crossfade multiplier as last published by the mixer
    pub fn fade_multiplier(&self) -> f32 {
        f32::from_bits(self.fade_multiplier.load(Ordering::Relaxed))
    }

    /// Number of effects the mixer played in its last period
    pub fn active_effects(&self) -> usize {
        self.active_effects.load(Ordering::Relaxed)
    }

    /// Total events dropped because the control thread fell behind
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn publish(&self, fade_multiplier: f32, active_effects: usize) {
        self.fade_multiplier
            .store(fade_multiplier.to_bits(), Ordering::Relaxed);
        self.active_effects.store(active_effects, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped_event(&self) {
        self.dropped_events.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MixerParams {
    fn default() -> Self {
        Self::new()
    }
}
