//! Playback instances shared between game code and the mixer
//!
//! Game code owns its instances; the mixer only holds clones of the handles
//! while they are active. Handles are `basedrop::Shared` pointers, so when the
//! audio thread drops the last clone the memory is reclaimed later by the
//! collector on the control thread instead of inside the callback.
//!
//! Mutable per-instance state (cursor, loop flag, volume) lives in atomics:
//! the audio thread is the only writer of cursors and positions, the control
//! thread the only writer of loop flags and volumes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

use basedrop::{Handle, Shared};

use crate::group::SoundGroup;
use crate::source::{EffectSource, MusicSource};
use crate::types::{duration_secs, Channels, Sample};
use crate::volume::AtomicVolume;

/// Source of unique instance identifiers
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an effect instance or music track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Completion callback attached to an effect instance
pub type EndCallback = Box<dyn FnMut() + Send>;

/// Completion callback slot
///
/// `generation` changes on every set or clear, so a callback that replaced
/// or removed itself while running is not put back afterwards.
#[derive(Default)]
struct EndSlot {
    callback: Option<EndCallback>,
    generation: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sound effects
// ─────────────────────────────────────────────────────────────────────────────

/// A loaded sound effect, shared read-only by all of its instances
#[derive(Clone)]
pub struct SoundEffect {
    source: Shared<EffectSource>,
}

impl SoundEffect {
    /// Wrap decoded effect data for sharing with the audio thread
    pub fn new(handle: &Handle, source: EffectSource) -> Self {
        Self {
            source: Shared::new(handle, source),
        }
    }

    /// The decoded data
    pub fn source(&self) -> &EffectSource {
        &self.source
    }

    /// Create a new playable instance of this effect
    pub fn create_instance(&self, handle: &Handle, group: SoundGroup) -> EffectInstance {
        EffectInstance::new(handle, self.clone(), group)
    }
}

impl std::fmt::Debug for SoundEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SoundEffect").field(&*self.source).finish()
    }
}

struct EffectState {
    id: InstanceId,
    sound: SoundEffect,
    group: SoundGroup,
    looped: AtomicBool,
    volume: AtomicVolume,
    /// Sample offset into the source (written by the audio thread only)
    cursor: AtomicU64,
    /// Whether the instance is in the mixer's active set
    active: AtomicBool,
    /// Only ever locked on the control thread
    on_end: Mutex<EndSlot>,
}

/// One playback of a sound effect
///
/// Cloning produces another handle to the same instance.
#[derive(Clone)]
pub struct EffectInstance {
    state: Shared<EffectState>,
}

impl EffectInstance {
    /// Create an instance of `sound` tagged with `group`
    pub fn new(handle: &Handle, sound: SoundEffect, group: SoundGroup) -> Self {
        Self {
            state: Shared::new(
                handle,
                EffectState {
                    id: InstanceId::next(),
                    sound,
                    group,
                    looped: AtomicBool::new(false),
                    volume: AtomicVolume::new(1.0),
                    cursor: AtomicU64::new(0),
                    active: AtomicBool::new(false),
                    on_end: Mutex::new(EndSlot::default()),
                },
            ),
        }
    }

    /// Unique identity of this instance
    pub fn id(&self) -> InstanceId {
        self.state.id
    }

    /// The effect this instance plays
    pub fn sound(&self) -> &SoundEffect {
        &self.state.sound
    }

    /// Group used for volume lookup
    pub fn group(&self) -> SoundGroup {
        self.state.group
    }

    /// Whether the instance restarts when it reaches the end
    pub fn is_looped(&self) -> bool {
        self.state.looped.load(Ordering::Relaxed)
    }

    /// Set the loop flag (takes effect at the next wrap)
    pub fn set_looped(&self, looped: bool) {
        self.state.looped.store(looped, Ordering::Relaxed);
    }

    /// Per-instance volume in [0, 1]
    pub fn volume(&self) -> f32 {
        self.state.volume.get()
    }

    /// Set the per-instance volume (clamped to [0, 1])
    pub fn set_volume(&self, volume: f32) {
        self.state.volume.set(volume);
    }

    /// Current sample offset into the source
    pub fn cursor(&self) -> u64 {
        self.state.cursor.load(Ordering::Relaxed)
    }

    /// Whether the mixer is currently playing this instance
    pub fn is_playing(&self) -> bool {
        self.state.active.load(Ordering::Relaxed)
    }

    /// Register a callback fired when the instance finishes without looping
    ///
    /// The callback runs on the control thread during
    /// [`AudioManager::update`](crate::manager::AudioManager::update), never
    /// on the audio thread. It is not fired for explicit stops.
    pub fn set_on_end<F>(&self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        if let Ok(mut slot) = self.state.on_end.lock() {
            slot.callback = Some(Box::new(callback));
            slot.generation = slot.generation.wrapping_add(1);
        }
    }

    /// Remove the completion callback
    pub fn clear_on_end(&self) {
        if let Ok(mut slot) = self.state.on_end.lock() {
            slot.callback = None;
            slot.generation = slot.generation.wrapping_add(1);
        }
    }

    /// Run the completion callback, if any (control thread)
    ///
    /// The callback runs with the slot unlocked, so it may set or clear the
    /// callback of its own instance.
    pub(crate) fn fire_on_end(&self) {
        let (callback, generation) = match self.state.on_end.lock() {
            Ok(mut slot) => (slot.callback.take(), slot.generation),
            Err(_) => return,
        };
        let Some(mut callback) = callback else {
            return;
        };

        callback();

        if let Ok(mut slot) = self.state.on_end.lock() {
            if slot.generation == generation && slot.callback.is_none() {
                slot.callback = Some(callback);
            }
        }
    }

    /// Rewind to the first sample (audio thread)
    #[inline]
    pub(crate) fn restart(&self) {
        self.state.cursor.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_playing(&self, playing: bool) {
        self.state.active.store(playing, Ordering::Relaxed);
    }

    /// Read the sample under the cursor and advance (audio thread)
    ///
    /// Returns the sample and whether the cursor reached the end of the
    /// source with this read, in which case it has been reset to 0. An empty
    /// source yields silence and reports the end immediately.
    #[inline]
    pub(crate) fn next_sample(&self) -> (Sample, bool) {
        let source = self.state.sound.source();
        let len = source.len();
        if len == 0 {
            return (0.0, true);
        }

        let cursor = self.state.cursor.load(Ordering::Relaxed);
        // A cursor past the end can only come from a foreign write; start over
        let cursor = if cursor >= len { 0 } else { cursor };
        let value = source.sample(cursor);

        let next = cursor + 1;
        let finished = next >= len;
        self.state
            .cursor
            .store(if finished { 0 } else { next }, Ordering::Relaxed);

        (value, finished)
    }
}

impl PartialEq for EffectInstance {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for EffectInstance {}

impl std::fmt::Debug for EffectInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectInstance")
            .field("id", &self.id())
            .field("group", &self.group())
            .field("looped", &self.is_looped())
            .field("cursor", &self.cursor())
            .field("playing", &self.is_playing())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Music
// ─────────────────────────────────────────────────────────────────────────────

struct MusicState {
    id: InstanceId,
    sample_rate: u32,
    channels: Channels,
    length: u64,
    looped: AtomicBool,
    volume: AtomicVolume,
    /// Set by the mixer when the track is (re)assigned; honored before the next read
    rewind_requested: AtomicBool,
    /// Mirror of the stream position for control-thread queries
    position: AtomicU64,
    /// Only locked by the audio thread, with `try_lock`
    source: Mutex<MusicSource>,
}

/// A streaming music track
///
/// Unlike effects, a track owns its reader, so one track plays at one
/// position at a time. Cloning produces another handle to the same track.
#[derive(Clone)]
pub struct MusicTrack {
    state: Shared<MusicState>,
}

impl MusicTrack {
    /// Wrap a music stream for sharing with the audio thread
    pub fn new(handle: &Handle, source: MusicSource) -> Self {
        Self {
            state: Shared::new(
                handle,
                MusicState {
                    id: InstanceId::next(),
                    sample_rate: source.sample_rate(),
                    channels: source.channels(),
                    length: source.len(),
                    looped: AtomicBool::new(true),
                    volume: AtomicVolume::new(1.0),
                    rewind_requested: AtomicBool::new(false),
                    position: AtomicU64::new(source.position()),
                    source: Mutex::new(source),
                },
            ),
        }
    }

    /// Unique identity of this track
    pub fn id(&self) -> InstanceId {
        self.state.id
    }

    /// Sample rate of the stream
    pub fn sample_rate(&self) -> u32 {
        self.state.sample_rate
    }

    /// Channel layout of the stream
    pub fn channels(&self) -> Channels {
        self.state.channels
    }

    /// Number of samples in the stream
    pub fn len(&self) -> u64 {
        self.state.length
    }

    /// Whether the stream holds no samples
    pub fn is_empty(&self) -> bool {
        self.state.length == 0
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        duration_secs(self.state.length, self.state.channels, self.state.sample_rate)
    }

    /// Samples read since the last rewind (updated once per audio callback)
    pub fn position(&self) -> u64 {
        self.state.position.load(Ordering::Relaxed)
    }

    /// Playback position in seconds
    pub fn position_secs(&self) -> f32 {
        duration_secs(self.position(), self.state.channels, self.state.sample_rate)
    }

    /// Whether the track restarts when the stream wraps (default `true`)
    ///
    /// A track that is not looped ends when the stream wraps: the mixer drops
    /// it and emits [`MixerEvent::MusicEnded`](crate::engine::MixerEvent).
    pub fn is_looped(&self) -> bool {
        self.state.looped.load(Ordering::Relaxed)
    }

    /// Set the loop flag
    pub fn set_looped(&self, looped: bool) {
        self.state.looped.store(looped, Ordering::Relaxed);
    }

    /// Per-track volume in [0, 1]
    pub fn volume(&self) -> f32 {
        self.state.volume.get()
    }

    /// Set the per-track volume (clamped to [0, 1])
    pub fn set_volume(&self, volume: f32) {
        self.state.volume.set(volume);
    }

    /// Ask for the stream to restart at the start-of-audio marker
    pub(crate) fn request_rewind(&self) {
        self.state.rewind_requested.store(true, Ordering::Relaxed);
        self.state.position.store(0, Ordering::Relaxed);
    }

    /// Take the stream for reading (audio thread)
    ///
    /// Never blocks: if the stream is somehow locked elsewhere the track
    /// contributes nothing this period.
    pub(crate) fn try_reader(&self) -> Option<MusicReader<'_>> {
        let mut source = match self.state.source.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return None,
        };

        if self.state.rewind_requested.swap(false, Ordering::Relaxed) {
            let _ = source.reset_position();
        }

        Some(MusicReader {
            source,
            position: &self.state.position,
        })
    }
}

impl PartialEq for MusicTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for MusicTrack {}

impl std::fmt::Debug for MusicTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicTrack")
            .field("id", &self.id())
            .field("channels", &self.channels())
            .field("length", &self.len())
            .field("looped", &self.is_looped())
            .finish()
    }
}

/// Exclusive read access to a track's stream for one audio callback
///
/// Publishes the stream position for control-thread queries when dropped.
pub(crate) struct MusicReader<'a> {
    source: MutexGuard<'a, MusicSource>,
    position: &'a AtomicU64,
}

impl MusicReader<'_> {
    /// Read the next sample; see [`MusicSource::next_sample`]
    #[inline]
    pub(crate) fn next_sample(&mut self) -> (Sample, bool) {
        self.source.next_sample()
    }
}

impl Drop for MusicReader<'_> {
    fn drop(&mut self) {
        self.position.store(self.source.position(), Ordering::Relaxed);
    }
}
