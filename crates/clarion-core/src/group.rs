//! Sound effect groups and their volume table
//!
//! Every effect instance is tagged with a [`SoundGroup`]. The mixer multiplies
//! each effect sample by the current volume of its group, so whole categories
//! (UI clicks, ambience, dialogue) can be attenuated with a single setter.

use serde::{Deserialize, Serialize};

use crate::volume::AtomicVolume;

/// Number of sound groups
pub const NUM_GROUPS: usize = 4;

/// Category of a sound effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(usize)]
pub enum SoundGroup {
    /// Gameplay effects (default)
    #[default]
    Effects = 0,
    /// Menu and interface sounds
    Ui = 1,
    /// Background ambience
    Ambient = 2,
    /// Dialogue and voice lines
    Voice = 3,
}

impl SoundGroup {
    /// All groups in index order
    pub const ALL: [SoundGroup; NUM_GROUPS] = [
        SoundGroup::Effects,
        SoundGroup::Ui,
        SoundGroup::Ambient,
        SoundGroup::Voice,
    ];

    /// Convert from index (0-3) to a group
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Index into the volume table
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Display name of this group
    pub fn name(&self) -> &'static str {
        match self {
            SoundGroup::Effects => "Effects",
            SoundGroup::Ui => "UI",
            SoundGroup::Ambient => "Ambient",
            SoundGroup::Voice => "Voice",
        }
    }
}

/// Per-group volume multipliers
///
/// Fixed-size table indexed by [`SoundGroup`], so lookups never fail.
/// Written by the control thread, read by the audio callback.
#[derive(Debug)]
pub struct GroupVolumes {
    volumes: [AtomicVolume; NUM_GROUPS],
}

impl GroupVolumes {
    /// Create a table with every group at full volume
    pub fn new() -> Self {
        Self {
            volumes: std::array::from_fn(|_| AtomicVolume::new(1.0)),
        }
    }

    /// Volume of a group
    #[inline]
    pub fn get(&self, group: SoundGroup) -> f32 {
        self.volumes[group.index()].get()
    }

    /// Set the volume of a group (clamped to [0, 1])
    pub fn set(&self, group: SoundGroup, value: f32) {
        self.volumes[group.index()].set(value);
    }

    /// Copy all volumes into a plain array
    ///
    /// The mixer takes one snapshot per callback instead of reading the
    /// atomics for every sample.
    pub fn snapshot(&self) -> [f32; NUM_GROUPS] {
        std::array::from_fn(|i| self.volumes[i].get())
    }
}

impl Default for GroupVolumes {
    fn default() -> Self {
        Self::new()
    }
}
