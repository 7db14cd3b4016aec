//! Ordered music track list (control thread only)
//!
//! The mixer knows nothing about playlists: it plays whatever track it was
//! last told to. The manager owns a [`Playlist`] and turns its moves into
//! ordinary music switches, so every transition goes through the crossfade.

use crate::instance::{InstanceId, MusicTrack};

/// An ordered list of music tracks with a cursor
#[derive(Debug, Default)]
pub struct Playlist {
    tracks: Vec<MusicTrack>,
    index: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track
    pub fn add(&mut self, track: MusicTrack) {
        self.tracks.push(track);
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All tracks in order
    pub fn tracks(&self) -> &[MusicTrack] {
        &self.tracks
    }

    /// Index of the current track
    pub fn current_index(&self) -> Option<usize> {
        (!self.tracks.is_empty()).then_some(self.index)
    }

    /// The current track, `None` when the list is empty
    pub fn current(&self) -> Option<&MusicTrack> {
        self.tracks.get(self.index)
    }

    /// Whether `id` is the current track
    pub fn is_current(&self, id: InstanceId) -> bool {
        self.current().is_some_and(|track| track.id() == id)
    }

    /// Move to the next track, wrapping to the first after the last
    pub fn next(&mut self) -> Option<&MusicTrack> {
        if self.tracks.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.tracks.len();
        self.current()
    }

    /// Move to the previous track, wrapping to the last before the first
    pub fn previous(&mut self) -> Option<&MusicTrack> {
        if self.tracks.is_empty() {
            return None;
        }
        self.index = if self.index == 0 {
            self.tracks.len() - 1
        } else {
            self.index - 1
        };
        self.current()
    }

    /// Remove every track and reset the cursor
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.index = 0;
    }

    /// Whether the current track is close enough to its end to move on
    ///
    /// True once the playback position reaches `duration - lead_secs` and
    /// there is another track to move to.
    pub fn should_advance(&self, lead_secs: f32) -> bool {
        if self.tracks.len() < 2 {
            return false;
        }
        self.current().is_some_and(|track| {
            let duration = track.duration_secs();
            duration > 0.0 && track.position_secs() >= duration - lead_secs
        })
    }
}
