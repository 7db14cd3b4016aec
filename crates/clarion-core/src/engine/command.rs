//! Lock-free command queue for real-time mixer control
//!
//! The control thread (game loop) never touches the mixer's active set or
//! music slots directly. It pushes commands into a wait-free SPSC ringbuffer
//! and the audio callback applies them all at the start of its next period,
//! before any sample is generated. A period therefore always mixes one
//! consistent state.
//!
//! Volumes do not go through this queue: they are relaxed atomics read by
//! the callback (see [`MixerParams`](super::MixerParams)).
//!
//! # Usage
//!
//! ```ignore
//! // At startup
//! let (tx, rx) = command_channel();
//!
//! // Control thread: send commands (non-blocking)
//! tx.push(MixerCommand::Play(instance));
//!
//! // Audio thread: apply pending commands
//! mixer.process_commands(&mut rx);
//! ```

use crate::instance::{EffectInstance, InstanceId, MusicTrack};

/// Commands sent from the control thread to the audio thread
///
/// Every payload is a pointer-sized shared handle, so the enum stays small
/// and pushing never copies sample data.
pub enum MixerCommand {
    /// Start or restart an effect instance
    ///
    /// Ignored when the active set is at capacity (drop-new policy).
    Play(EffectInstance),
    /// Remove an effect instance from the active set (no completion event)
    Stop(InstanceId),
    /// Switch music: immediate when nothing plays, crossfade otherwise
    SetMusic(MusicTrack),
    /// Fade the current music out and leave silence
    StopMusic,
    /// Restart the current music from its beginning at full level
    ResetMusic,
}

impl std::fmt::Debug for MixerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MixerCommand::Play(instance) => write!(f, "Play({})", instance.id()),
            MixerCommand::Stop(id) => write!(f, "Stop({})", id),
            MixerCommand::SetMusic(track) => write!(f, "SetMusic({})", track.id()),
            MixerCommand::StopMusic => write!(f, "StopMusic"),
            MixerCommand::ResetMusic => write!(f, "ResetMusic"),
        }
    }
}

/// Capacity of the command queue
///
/// A game step rarely issues more than a handful of commands; 256 leaves
/// room for bursts (level loads starting many ambient loops at once).
pub const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Create a new command channel (producer/consumer pair)
///
/// Returns `(Producer, Consumer)` where:
/// - Producer: Send side, owned by the control thread
/// - Consumer: Receive side, owned by the audio thread
pub fn command_channel() -> (rtrb::Producer<MixerCommand>, rtrb::Consumer<MixerCommand>) {
    rtrb::RingBuffer::new(COMMAND_QUEUE_CAPACITY)
}

/// Command sender for the control thread
///
/// Wraps the lock-free producer. All operations are non-blocking.
pub struct CommandSender {
    pub(crate) producer: rtrb::Producer<MixerCommand>,
}

impl CommandSender {
    /// Wrap the producer side of a [`command_channel`]
    pub fn new(producer: rtrb::Producer<MixerCommand>) -> Self {
        Self { producer }
    }

    /// Send a command to the mixer (non-blocking)
    ///
    /// Returns `Err(cmd)` if the queue is full (command is returned).
    pub fn send(&mut self, cmd: MixerCommand) -> Result<(), MixerCommand> {
        self.producer.push(cmd).map_err(|e| match e {
            rtrb::PushError::Full(value) => value,
        })
    }

    /// Check if the queue has space for more commands
    pub fn has_space(&self) -> bool {
        self.producer.slots() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_channel_creation() {
        let (tx, mut rx) = command_channel();
        let mut sender = CommandSender::new(tx);

        sender.send(MixerCommand::StopMusic).unwrap();

        let cmd = rx.pop().unwrap();
        assert!(matches!(cmd, MixerCommand::StopMusic));
    }

    #[test]
    fn test_command_channel_empty() {
        let (_tx, mut rx) = command_channel();
        assert!(rx.pop().is_err());
    }

    #[test]
    fn test_full_queue_returns_command() {
        let (tx, _rx) = command_channel();
        let mut sender = CommandSender::new(tx);
        for _ in 0..COMMAND_QUEUE_CAPACITY {
            sender.send(MixerCommand::StopMusic).unwrap();
        }
        assert!(!sender.has_space());
        assert!(matches!(
            sender.send(MixerCommand::StopMusic),
            Err(MixerCommand::StopMusic)
        ));
    }

    #[test]
    fn test_command_size() {
        // Payloads are shared handles; keep the enum within two words
        let size = std::mem::size_of::<MixerCommand>();
        assert!(size <= 16, "MixerCommand is {} bytes, expected <= 16", size);
    }
}
