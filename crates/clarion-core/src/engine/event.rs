//! Notifications from the audio thread back to the control thread
//!
//! The callback never runs game code. Completion and music changes are
//! pushed into a second SPSC ringbuffer and drained once per game step by
//! [`AudioManager::update`](crate::manager::AudioManager::update), where the
//! registered handlers run. Handlers may therefore call back into the
//! manager without re-entrancy hazards.

use crate::instance::{EffectInstance, MusicTrack};

/// Events emitted by the mixer
#[derive(Debug, Clone)]
pub enum MixerEvent {
    /// An effect instance reached its end without looping and was removed
    EffectEnded(EffectInstance),
    /// A music switch committed; `None` when the mixer went silent
    MusicChanged(Option<MusicTrack>),
    /// A non-looped music track wrapped and was dropped
    MusicEnded(MusicTrack),
}

/// Capacity of the event queue
///
/// At most `max_concurrent` effects can end per period; 256 absorbs several
/// periods of completions between two game steps.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Create a new event channel (producer/consumer pair)
///
/// The producer lives in the mixer (audio thread), the consumer in the
/// manager (control thread).
pub fn event_channel() -> (rtrb::Producer<MixerEvent>, rtrb::Consumer<MixerEvent>) {
    rtrb::RingBuffer::new(EVENT_QUEUE_CAPACITY)
}
