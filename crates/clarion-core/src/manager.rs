//! Game-facing audio manager
//!
//! [`AudioManager`] is the control-thread half of the engine. It owns the
//! command producer, the event consumer, the shared parameters and the
//! `basedrop` collector; the [`MixerProcessor`] it pairs with runs on the
//! audio thread.
//!
//! Game code calls the manager once per step:
//!
//! ```ignore
//! let mut audio = AudioManager::start(&mixer_config, &audio_config)?;
//! let jump = audio.load_effect(decoded_jump);
//! let instance = audio.create_instance(&jump, SoundGroup::Effects);
//!
//! loop {
//!     if input.jumped() {
//!         audio.play(&instance);
//!     }
//!     audio.update(); // completion handlers, playlist, deferred drops
//! }
//! ```

use std::sync::Arc;

use basedrop::{Collector, Handle};

use crate::audio::{start_output, AudioConfig, AudioHandle, AudioResult};
use crate::config::MixerConfig;
use crate::engine::{
    command_channel, event_channel, CommandSender, Mixer, MixerCommand, MixerEvent, MixerParams,
    MixerProcessor,
};
use crate::group::SoundGroup;
use crate::instance::{EffectInstance, MusicTrack, SoundEffect};
use crate::playlist::Playlist;
use crate::source::{EffectSource, MusicSource};

type EffectEndHandler = Box<dyn FnMut(&EffectInstance)>;
type MusicChangeHandler = Box<dyn FnMut(Option<&MusicTrack>)>;
type MusicEndHandler = Box<dyn FnMut(&MusicTrack)>;

/// Control-thread interface to the mixer
pub struct AudioManager {
    /// Output stream; `None` when driven offline
    output: Option<AudioHandle>,
    commands: CommandSender,
    events: rtrb::Consumer<MixerEvent>,
    params: Arc<MixerParams>,
    config: MixerConfig,

    playlist: Playlist,
    /// Set while a playlist move waits for its crossfade to commit
    advancing: bool,
    /// Track the mixer last reported as audible
    now_playing: Option<MusicTrack>,

    on_effect_end: Option<EffectEndHandler>,
    on_music_change: Option<MusicChangeHandler>,
    on_music_end: Option<MusicEndHandler>,

    /// Declared last: reclaims whatever the audio thread released
    collector: Collector,
}

impl AudioManager {
    /// Open the output device and start mixing
    ///
    /// Failing to open the device is the only error the engine reports;
    /// every operation after this point is infallible.
    pub fn start(config: &MixerConfig, audio: &AudioConfig) -> AudioResult<Self> {
        let (mut manager, processor) = Self::detached(config);
        let handle = start_output(audio, processor)?;

        if handle.sample_rate() != manager.config.sample_rate {
            log::warn!(
                "Device runs at {}Hz but sources are expected at {}Hz",
                handle.sample_rate(),
                manager.config.sample_rate
            );
        }
        manager.output = Some(handle);
        Ok(manager)
    }

    /// Create a manager without a device
    ///
    /// The returned processor must be driven by the caller (offline
    /// rendering, tests, or a custom host binding).
    pub fn detached(config: &MixerConfig) -> (Self, MixerProcessor) {
        let config = config.sanitized();
        let params = Arc::new(MixerParams::from_config(&config));
        let (command_tx, command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();

        let mixer = Mixer::new(&config, Arc::clone(&params), event_tx);
        log::info!(
            "Mixer ready: {} effect slots, fade step {}, {}Hz",
            config.max_concurrent,
            config.fade_speed,
            config.sample_rate
        );

        let manager = Self {
            output: None,
            commands: CommandSender::new(command_tx),
            events: event_rx,
            params,
            config,
            playlist: Playlist::new(),
            advancing: false,
            now_playing: None,
            on_effect_end: None,
            on_music_change: None,
            on_music_end: None,
            collector: Collector::new(),
        };
        (manager, MixerProcessor::new(mixer, command_rx))
    }

    /// The running output stream, if any
    pub fn output(&self) -> Option<&AudioHandle> {
        self.output.as_ref()
    }

    /// Effective (sanitized) configuration
    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// Shared parameters and mirrors
    pub fn params(&self) -> &Arc<MixerParams> {
        &self.params
    }

    /// Handle for allocating objects shared with the audio thread
    pub fn handle(&self) -> Handle {
        self.collector.handle()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────

    /// Wrap decoded effect data for playback
    pub fn load_effect(&self, source: EffectSource) -> SoundEffect {
        self.check_sample_rate("effect", source.sample_rate());
        SoundEffect::new(&self.handle(), source)
    }

    /// Create a playable instance of an effect
    pub fn create_instance(&self, sound: &SoundEffect, group: SoundGroup) -> EffectInstance {
        sound.create_instance(&self.handle(), group)
    }

    /// Wrap a music stream for playback
    pub fn load_music(&self, source: MusicSource) -> MusicTrack {
        self.check_sample_rate("music", source.sample_rate());
        MusicTrack::new(&self.handle(), source)
    }

    fn check_sample_rate(&self, kind: &str, sample_rate: u32) {
        if sample_rate != self.config.sample_rate {
            log::warn!(
                "Loaded {} at {}Hz; the mixer expects {}Hz and will not resample",
                kind,
                sample_rate,
                self.config.sample_rate
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Playback
    // ─────────────────────────────────────────────────────────────────────

    /// Queue a command; `false` when the queue was full and it was dropped
    fn send(&mut self, cmd: MixerCommand) -> bool {
        match self.commands.send(cmd) {
            Ok(()) => true,
            Err(cmd) => {
                log::warn!("Mixer command queue full, dropping {:?}", cmd);
                false
            }
        }
    }

    /// Start or restart an effect instance
    ///
    /// Ignored by the mixer when `max_concurrent` effects are already playing.
    pub fn play(&mut self, instance: &EffectInstance) {
        self.send(MixerCommand::Play(instance.clone()));
    }

    /// Stop an effect instance without firing its completion callbacks
    pub fn stop(&mut self, instance: &EffectInstance) {
        self.send(MixerCommand::Stop(instance.id()));
    }

    /// Switch music, crossfading when something is already playing
    ///
    /// Overrides a playlist move still waiting for its crossfade.
    pub fn set_music(&mut self, track: &MusicTrack) {
        self.advancing = false;
        self.send(MixerCommand::SetMusic(track.clone()));
    }

    /// Fade the current music out
    pub fn stop_music(&mut self) {
        self.advancing = false;
        self.send(MixerCommand::StopMusic);
    }

    /// Restart the current music from its beginning at full level
    ///
    /// Cancels a crossfade in progress.
    pub fn reset_music(&mut self) {
        self.advancing = false;
        self.send(MixerCommand::ResetMusic);
    }

    /// Track the mixer last reported as audible
    pub fn current_music(&self) -> Option<&MusicTrack> {
        self.now_playing.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Volumes
    // ─────────────────────────────────────────────────────────────────────

    pub fn master_volume(&self) -> f32 {
        self.params.master_volume()
    }

    /// Set master volume (clamped to [0, 1])
    pub fn set_master_volume(&self, volume: f32) {
        self.params.set_master_volume(volume);
    }

    pub fn music_volume(&self) -> f32 {
        self.params.music_volume()
    }

    /// Set music volume (clamped to [0, 1])
    pub fn set_music_volume(&self, volume: f32) {
        self.params.set_music_volume(volume);
    }

    pub fn group_volume(&self, group: SoundGroup) -> f32 {
        self.params.groups().get(group)
    }

    /// Set a group's volume (clamped to [0, 1])
    pub fn set_group_volume(&self, group: SoundGroup, volume: f32) {
        self.params.groups().set(group, volume);
    }

    pub fn is_music_paused(&self) -> bool {
        self.params.music_paused()
    }

    /// Pause or resume music; effects keep playing
    pub fn set_music_paused(&self, paused: bool) {
        self.params.set_music_paused(paused);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────

    /// Called for every effect that finished without looping
    pub fn on_effect_end<F>(&mut self, handler: F)
    where
        F: FnMut(&EffectInstance) + 'static,
    {
        self.on_effect_end = Some(Box::new(handler));
    }

    /// Called whenever the audible music track changes (`None` = silence)
    pub fn on_music_change<F>(&mut self, handler: F)
    where
        F: FnMut(Option<&MusicTrack>) + 'static,
    {
        self.on_music_change = Some(Box::new(handler));
    }

    /// Called when a non-looped music track runs out
    pub fn on_music_end<F>(&mut self, handler: F)
    where
        F: FnMut(&MusicTrack) + 'static,
    {
        self.on_music_end = Some(Box::new(handler));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Playlist
    // ─────────────────────────────────────────────────────────────────────

    /// The playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Append a track to the playlist; the first one starts playing
    pub fn add_music(&mut self, track: &MusicTrack) {
        let was_empty = self.playlist.is_empty();
        self.playlist.add(track.clone());
        if was_empty {
            self.set_music(track);
        }
    }

    /// Crossfade to the next playlist track (wraps around)
    pub fn next_music(&mut self) {
        self.move_playlist(true);
    }

    /// Crossfade to the previous playlist track (wraps around)
    pub fn previous_music(&mut self) {
        self.move_playlist(false);
    }

    fn move_playlist(&mut self, forward: bool) {
        let moved = if forward {
            self.playlist.next()
        } else {
            self.playlist.previous()
        };
        let Some(track) = moved.cloned() else {
            return;
        };

        // Landing on the audible track commits nothing, so no event will come
        let waits = self.now_playing.as_ref() != Some(&track);
        if self.send(MixerCommand::SetMusic(track)) {
            self.advancing = waits;
        } else {
            // Keep the list on the track the mixer is actually playing
            if forward {
                self.playlist.previous();
            } else {
                self.playlist.next();
            }
            self.advancing = false;
        }
    }

    /// Empty the playlist and fade the music out
    pub fn clear_playlist(&mut self) {
        if !self.playlist.is_empty() {
            self.playlist.clear();
            self.stop_music();
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Per-step housekeeping
    // ─────────────────────────────────────────────────────────────────────

    /// Process everything the audio thread reported since the last call
    ///
    /// Runs completion callbacks, advances the playlist and frees objects
    /// the audio thread released. Call once per game step.
    pub fn update(&mut self) {
        while let Ok(event) = self.events.pop() {
            self.dispatch(event);
        }

        if !self.advancing && self.playlist.should_advance(self.config.track_distance_secs) {
            log::debug!("Playlist track near its end, advancing");
            self.next_music();
        }

        self.collector.collect();
    }

    fn dispatch(&mut self, event: MixerEvent) {
        match event {
            MixerEvent::EffectEnded(instance) => {
                instance.fire_on_end();
                if let Some(handler) = self.on_effect_end.as_mut() {
                    handler(&instance);
                }
            }
            MixerEvent::MusicChanged(track) => {
                log::debug!("Music changed to {:?}", track.as_ref().map(|t| t.id()));
                self.advancing = false;
                self.now_playing = track;
                if let Some(handler) = self.on_music_change.as_mut() {
                    handler(self.now_playing.as_ref());
                }
            }
            MixerEvent::MusicEnded(track) => {
                log::debug!("Music {} ended", track.id());
                if self.now_playing.as_ref() == Some(&track) {
                    self.now_playing = None;
                }
                if let Some(handler) = self.on_music_end.as_mut() {
                    handler(&track);
                }
                if self.playlist.len() > 1 && self.playlist.is_current(track.id()) {
                    self.next_music();
                }
            }
        }
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        // Stop the callback before anything it references goes away
        drop(self.output.take());
        self.collector.collect();
    }
}
