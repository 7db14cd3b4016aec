//! Mixer configuration section

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::group::SoundGroup;
use crate::types::SAMPLE_RATE;
use crate::volume::clamp_volume;

/// Default maximum number of simultaneous effects
pub const DEFAULT_MAX_CONCURRENT: usize = 15;

/// Default crossfade step per audio callback
pub const DEFAULT_FADE_SPEED: f32 = 0.01;

/// Default lead time before a track's end at which a playlist advances
pub const DEFAULT_TRACK_DISTANCE_SECS: f32 = 1.0;

/// Mixer settings, stored as YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Maximum number of effects mixed at once; further plays are dropped
    /// Default: 15
    pub max_concurrent: usize,

    /// Crossfade step applied once per audio callback
    /// Default: 0.01 (100 callbacks for a full fade)
    pub fade_speed: f32,

    /// Canonical sample rate every source must share
    /// Default: 48000
    pub sample_rate: u32,

    /// Master volume applied to everything
    pub master_volume: f32,

    /// Music volume
    pub music_volume: f32,

    /// Per-group effect volumes; groups not listed play at full volume
    pub group_volumes: BTreeMap<SoundGroup, f32>,

    /// Seconds before the end of a playlist track at which the next one
    /// starts fading in
    /// Default: 1.0
    pub track_distance_secs: f32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            fade_speed: DEFAULT_FADE_SPEED,
            sample_rate: SAMPLE_RATE,
            master_volume: 1.0,
            music_volume: 1.0,
            group_volumes: BTreeMap::new(),
            track_distance_secs: DEFAULT_TRACK_DISTANCE_SECS,
        }
    }
}

impl MixerConfig {
    /// Configured volume of a group (1.0 when not listed)
    pub fn group_volume(&self, group: SoundGroup) -> f32 {
        self.group_volumes.get(&group).copied().unwrap_or(1.0)
    }

    /// Copy with every value forced into its valid range
    ///
    /// Volumes are clamped to [0, 1], the fade step is made positive and
    /// capped at 1, and at least one effect slot is kept.
    pub fn sanitized(&self) -> Self {
        let fade_speed = self.fade_speed.abs();
        let fade_speed = if fade_speed.is_finite() && fade_speed > 0.0 {
            fade_speed.min(1.0)
        } else {
            DEFAULT_FADE_SPEED
        };

        let track_distance_secs = if self.track_distance_secs.is_finite() {
            self.track_distance_secs.max(0.0)
        } else {
            DEFAULT_TRACK_DISTANCE_SECS
        };

        Self {
            max_concurrent: self.max_concurrent.max(1),
            fade_speed,
            sample_rate: if self.sample_rate == 0 {
                SAMPLE_RATE
            } else {
                self.sample_rate
            },
            master_volume: clamp_volume(self.master_volume),
            music_volume: clamp_volume(self.music_volume),
            group_volumes: self
                .group_volumes
                .iter()
                .map(|(group, volume)| (*group, clamp_volume(*volume)))
                .collect(),
            track_distance_secs,
        }
    }
}
