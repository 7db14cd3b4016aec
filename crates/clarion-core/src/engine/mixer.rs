//! Mixer - Combines the music track and active sound effects
//!
//! Owned exclusively by the audio thread. Each callback:
//! 1. Applies queued commands (play, stop, music switches)
//! 2. Advances the crossfade by one step
//! 3. Fills every frame with music plus effects, saturating each add
//! 4. Commits a pending music switch once the fade reached silence
//!
//! Nothing here allocates, locks with an unbounded wait, or logs. The active
//! set is pre-allocated to `max_concurrent` and never grows past it.

use std::sync::Arc;

use super::command::MixerCommand;
use super::crossfade::Crossfade;
use super::event::MixerEvent;
use super::params::MixerParams;
use super::summing::mix_sample;
use crate::config::MixerConfig;
use crate::instance::{EffectInstance, InstanceId, MusicTrack};
use crate::types::{split_frames, Sample, StereoSample};

/// The real-time mixer
pub struct Mixer {
    /// Maximum number of effects mixed at once
    max_concurrent: usize,
    /// Canonical sample rate sources are expected to share
    sample_rate: u32,
    /// Effects currently playing (unordered; removal is swap-and-pop)
    active: Vec<EffectInstance>,
    /// Track currently audible
    current: Option<MusicTrack>,
    /// Track the crossfade is heading to (equal to `current` when settled)
    pending: Option<MusicTrack>,
    crossfade: Crossfade,
    /// Volumes written by the control thread, mirrors read by it
    params: Arc<MixerParams>,
    /// Notifications for the control thread
    events: rtrb::Producer<MixerEvent>,
}

impl Mixer {
    /// Create a mixer
    ///
    /// `config` should already be sanitized; `max_concurrent` is still forced
    /// to at least one so the active set is never unusable.
    pub fn new(
        config: &MixerConfig,
        params: Arc<MixerParams>,
        events: rtrb::Producer<MixerEvent>,
    ) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        let crossfade = Crossfade::new(config.fade_speed);
        params.publish(crossfade.multiplier(), 0);

        Self {
            max_concurrent,
            sample_rate: config.sample_rate,
            active: Vec::with_capacity(max_concurrent),
            current: None,
            pending: None,
            crossfade,
            params,
            events,
        }
    }

    /// Maximum number of concurrently mixed effects
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Canonical sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of effects in the active set
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Whether an effect instance is in the active set
    pub fn is_active(&self, id: InstanceId) -> bool {
        self.active.iter().any(|instance| instance.id() == id)
    }

    /// Track currently audible
    pub fn current_music(&self) -> Option<&MusicTrack> {
        self.current.as_ref()
    }

    /// Track the crossfade is heading to
    pub fn pending_music(&self) -> Option<&MusicTrack> {
        self.pending.as_ref()
    }

    /// Current crossfade multiplier
    pub fn fade_multiplier(&self) -> f32 {
        self.crossfade.multiplier()
    }

    /// Shared parameters
    pub fn params(&self) -> &Arc<MixerParams> {
        &self.params
    }

    /// Apply every pending command from the control thread
    pub fn process_commands(&mut self, commands: &mut rtrb::Consumer<MixerCommand>) {
        while let Ok(cmd) = commands.pop() {
            self.apply(cmd);
        }
    }

    /// Apply a single command
    pub fn apply(&mut self, cmd: MixerCommand) {
        match cmd {
            MixerCommand::Play(instance) => self.play(instance),
            MixerCommand::Stop(id) => self.stop(id),
            MixerCommand::SetMusic(track) => self.set_music(track),
            MixerCommand::StopMusic => self.stop_music(),
            MixerCommand::ResetMusic => self.reset_music(),
        }
    }

    /// Start or restart an effect instance
    ///
    /// At capacity the call does nothing at all, even for an instance that
    /// is already playing (drop-new, no eviction).
    pub fn play(&mut self, instance: EffectInstance) {
        if self.active.len() >= self.max_concurrent {
            return;
        }

        instance.restart();
        if !self.active.contains(&instance) {
            instance.set_playing(true);
            self.active.push(instance);
        }
    }

    /// Remove an effect instance; no completion event, idempotent
    pub fn stop(&mut self, id: InstanceId) {
        if let Some(idx) = self.active.iter().position(|instance| instance.id() == id) {
            let instance = self.active.swap_remove(idx);
            instance.set_playing(false);
        }
    }

    /// Switch music
    ///
    /// With no current track the new one starts at once at full level.
    /// Otherwise it becomes pending, rewound, and the crossfade takes over.
    /// Setting the current track again cancels a crossfade in progress.
    pub fn set_music(&mut self, track: MusicTrack) {
        match self.current.as_ref().map(|current| *current == track) {
            None => {
                track.request_rewind();
                self.crossfade.reset(1.0);
                self.current = Some(track.clone());
                self.pending = Some(track.clone());
                emit(
                    &mut self.events,
                    &self.params,
                    MixerEvent::MusicChanged(Some(track)),
                );
            }
            Some(true) => {
                self.pending = Some(track);
            }
            Some(false) => {
                track.request_rewind();
                self.pending = Some(track);
            }
        }
    }

    /// Fade out the current track and leave silence
    pub fn stop_music(&mut self) {
        self.pending = None;
    }

    /// Restart the current track from its beginning at full level
    ///
    /// Cancels a crossfade in progress. Does nothing without a current track.
    pub fn reset_music(&mut self) {
        if let Some(track) = self.current.as_ref() {
            track.request_rewind();
            self.crossfade.reset(1.0);
            self.pending = Some(track.clone());
        }
    }

    /// Fill an interleaved stereo buffer
    ///
    /// An odd trailing sample (half a frame) is zeroed.
    pub fn process(&mut self, output: &mut [Sample]) {
        let (frames, tail) = split_frames(output);
        tail.fill(0.0);
        self.process_frames(frames);
    }

    /// Fill a buffer of stereo frames
    pub fn process_frames(&mut self, frames: &mut [StereoSample]) {
        let Self {
            active,
            current,
            pending,
            crossfade,
            params,
            events,
            ..
        } = self;

        // One snapshot per callback; late or torn values cost one period
        let master = params.master_volume();
        let music_volume = params.music_volume();
        let paused = params.music_paused();
        let groups = params.groups().snapshot();

        crossfade.step(*current != *pending, paused);
        let fade = crossfade.multiplier();

        let mut music_ended = false;
        let mut music = match current.as_ref() {
            Some(track) if !paused => track.try_reader().map(|reader| {
                let gain = music_volume * fade * track.volume();
                (reader, gain, track.channels(), track.is_looped())
            }),
            _ => None,
        };

        for frame in frames.iter_mut() {
            *frame = StereoSample::silence();

            if let Some((reader, gain, channels, looped)) = music.as_mut() {
                let (raw, wrapped) = reader.next_sample();
                mix_sample(frame, raw, master, *gain, *channels);
                if wrapped && !*looped {
                    music_ended = true;
                }
            }
            if music_ended {
                music = None;
            }

            // Reverse order so swap_remove never skips an unvisited instance
            for idx in (0..active.len()).rev() {
                let instance = &active[idx];
                let (raw, finished) = instance.next_sample();
                let gain = groups[instance.group().index()] * instance.volume();
                mix_sample(frame, raw, master, gain, instance.sound().source().channels());

                if finished && !instance.is_looped() {
                    let ended = active.swap_remove(idx);
                    ended.set_playing(false);
                    emit(events, params, MixerEvent::EffectEnded(ended));
                }
            }
        }

        // Publishes the stream position
        drop(music);

        if music_ended {
            if let Some(track) = current.take() {
                if pending.as_ref() == Some(&track) {
                    *pending = None;
                }
                emit(events, params, MixerEvent::MusicEnded(track));
            }
        }

        if crossfade.is_silent() && *current != *pending {
            *current = pending.clone();
            emit(events, params, MixerEvent::MusicChanged(current.clone()));
        }

        params.publish(crossfade.multiplier(), active.len());
    }
}

/// Push an event, counting it as dropped when the control thread lags
#[inline]
fn emit(events: &mut rtrb::Producer<MixerEvent>, params: &MixerParams, event: MixerEvent) {
    if events.push(event).is_err() {
        params.record_dropped_event();
    }
}

/// Audio-thread half of the engine: the mixer plus its command queue
///
/// This is what a device backend drives. It is `Send` so it can be moved
/// into the stream callback.
pub struct MixerProcessor {
    mixer: Mixer,
    commands: rtrb::Consumer<MixerCommand>,
}

impl MixerProcessor {
    /// Pair a mixer with the consumer side of its command queue
    pub fn new(mixer: Mixer, commands: rtrb::Consumer<MixerCommand>) -> Self {
        Self { mixer, commands }
    }

    /// Apply queued commands, then fill an interleaved stereo buffer
    pub fn process(&mut self, output: &mut [Sample]) {
        self.mixer.process_commands(&mut self.commands);
        self.mixer.process(output);
    }

    /// Apply queued commands, then fill a buffer of stereo frames
    pub fn process_frames(&mut self, frames: &mut [StereoSample]) {
        self.mixer.process_commands(&mut self.commands);
        self.mixer.process_frames(frames);
    }

    /// The mixer being driven
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{command_channel, event_channel, CommandSender};
    use crate::group::SoundGroup;
    use crate::instance::SoundEffect;
    use crate::source::{EffectSource, MusicSource};
    use crate::types::Channels;
    use basedrop::Collector;

    struct Harness {
        collector: Collector,
        mixer: Mixer,
        events: rtrb::Consumer<MixerEvent>,
    }

    impl Harness {
        fn new(max_concurrent: usize, fade_speed: f32) -> Self {
            let config = MixerConfig {
                max_concurrent,
                fade_speed,
                ..MixerConfig::default()
            };
            let (tx, rx) = event_channel();
            let mixer = Mixer::new(&config, Arc::new(MixerParams::new()), tx);
            Self {
                collector: Collector::new(),
                mixer,
                events: rx,
            }
        }

        fn effect(&self, channels: Channels, samples: Vec<f32>) -> EffectInstance {
            let handle = self.collector.handle();
            SoundEffect::new(&handle, EffectSource::new(48000, channels, samples))
                .create_instance(&handle, SoundGroup::Effects)
        }

        fn music(&self, samples: &[f32]) -> MusicTrack {
            MusicTrack::new(
                &self.collector.handle(),
                MusicSource::from_samples(48000, Channels::Mono, samples),
            )
        }

        fn run(&mut self, n_frames: usize) -> Vec<StereoSample> {
            let mut frames = vec![StereoSample::silence(); n_frames];
            self.mixer.process_frames(&mut frames);
            frames
        }

        fn drain_events(&mut self) -> Vec<MixerEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.events.pop() {
                events.push(event);
            }
            events
        }
    }

    #[test]
    fn test_play_resets_cursor_and_activates() {
        let mut h = Harness::new(4, 0.01);
        let instance = h.effect(Channels::Mono, vec![0.1; 8]);
        h.mixer.play(instance.clone());
        assert_eq!(instance.cursor(), 0);
        assert!(instance.is_playing());
        assert!(h.mixer.is_active(instance.id()));
    }

    #[test]
    fn test_capacity_drops_new_plays() {
        let mut h = Harness::new(2, 0.01);
        let a = h.effect(Channels::Mono, vec![0.1; 100]);
        let b = h.effect(Channels::Mono, vec![0.1; 100]);
        let c = h.effect(Channels::Mono, vec![0.1; 100]);

        h.mixer.play(a.clone());
        h.mixer.play(b.clone());
        h.run(5);
        h.mixer.play(c.clone());

        assert_eq!(h.mixer.active_count(), 2);
        assert!(!h.mixer.is_active(c.id()));
        assert!(!c.is_playing());
        assert_eq!(a.cursor(), 5);
        assert_eq!(b.cursor(), 5);

        // Re-playing an active instance at capacity is a no-op as well
        h.mixer.play(a.clone());
        assert_eq!(a.cursor(), 5);
    }

    #[test]
    fn test_replay_below_capacity_restarts() {
        let mut h = Harness::new(4, 0.01);
        let a = h.effect(Channels::Mono, vec![0.1; 100]);
        h.mixer.play(a.clone());
        h.run(7);
        assert_eq!(a.cursor(), 7);

        h.mixer.play(a.clone());
        assert_eq!(a.cursor(), 0);
        assert_eq!(h.mixer.active_count(), 1);
    }

    #[test]
    fn test_ten_frame_effect_removed_once_at_call_ten() {
        let mut h = Harness::new(4, 0.01);
        let instance = h.effect(Channels::Mono, vec![0.2; 10]);
        h.mixer.play(instance.clone());

        let mut removed_at = None;
        let mut ended = 0;
        for call in 1..=15 {
            h.run(1);
            for event in h.drain_events() {
                if let MixerEvent::EffectEnded(done) = event {
                    assert_eq!(done, instance);
                    ended += 1;
                }
            }
            if removed_at.is_none() && !h.mixer.is_active(instance.id()) {
                removed_at = Some(call);
            }
        }

        assert_eq!(removed_at, Some(10));
        assert_eq!(ended, 1);
        assert!(!instance.is_playing());
    }

    #[test]
    fn test_looped_effect_never_removed() {
        let mut h = Harness::new(4, 0.01);
        let instance = h.effect(Channels::Mono, vec![0.2; 3]);
        instance.set_looped(true);
        h.mixer.play(instance.clone());

        h.run(31);
        assert!(h.mixer.is_active(instance.id()));
        assert_eq!(instance.cursor(), 1);
        assert!(h.drain_events().is_empty());
    }

    #[test]
    fn test_effect_ending_mid_buffer_goes_silent() {
        let mut h = Harness::new(4, 0.01);
        let instance = h.effect(Channels::Mono, vec![0.5; 3]);
        h.mixer.play(instance);

        let out = h.run(5);
        assert_eq!(out[2].left, 0.5);
        assert_eq!(out[3], StereoSample::silence());
        assert_eq!(out[4], StereoSample::silence());
    }

    #[test]
    fn test_stop_is_silent_and_idempotent() {
        let mut h = Harness::new(4, 0.01);
        let a = h.effect(Channels::Mono, vec![0.1; 10]);
        let b = h.effect(Channels::Mono, vec![0.1; 10]);
        h.mixer.play(a.clone());

        h.mixer.stop(b.id());
        assert_eq!(h.mixer.active_count(), 1);

        h.mixer.stop(a.id());
        h.mixer.stop(a.id());
        assert_eq!(h.mixer.active_count(), 0);
        assert!(!a.is_playing());
        assert!(h.drain_events().is_empty());
    }

    #[test]
    fn test_stereo_source_is_halved() {
        let mut h = Harness::new(4, 0.01);
        let samples = vec![0.8, -0.6, 1.0, -1.0, 0.25, 0.0];
        let instance = h.effect(Channels::Stereo, samples.clone());
        instance.set_looped(true);
        h.mixer.play(instance);

        let out = h.run(samples.len());
        for (frame, raw) in out.iter().zip(&samples) {
            let expected = (raw * 0.5_f32).abs().min(1.0);
            assert_eq!(frame.left.abs(), expected);
            assert_eq!(frame.right, frame.left);
        }
    }

    #[test]
    fn test_output_stays_in_range() {
        let mut h = Harness::new(15, 0.01);
        let track = h.music(&[1.0; 64]);
        h.mixer.set_music(track);
        for i in 0..15 {
            let value = if i % 4 == 0 { -1.0 } else { 1.0 };
            let instance = h.effect(Channels::Mono, vec![value; 50]);
            instance.set_looped(true);
            h.mixer.play(instance);
        }

        let out = h.run(256);
        for frame in out {
            assert!((-1.0..=1.0).contains(&frame.left));
            assert!((-1.0..=1.0).contains(&frame.right));
        }
    }

    #[test]
    fn test_volume_layers_multiply() {
        let mut h = Harness::new(4, 0.01);
        let params = h.mixer.params().clone();
        params.set_master_volume(0.5);
        params.groups().set(SoundGroup::Effects, 0.5);

        let instance = h.effect(Channels::Mono, vec![0.8; 4]);
        instance.set_volume(0.5);
        h.mixer.play(instance);

        let out = h.run(1);
        assert_eq!(out[0].left, 0.8 * 0.5 * 0.5 * 0.5);
    }

    #[test]
    fn test_group_volume_only_affects_its_group() {
        let mut h = Harness::new(4, 0.01);
        h.mixer.params().groups().set(SoundGroup::Ui, 0.0);

        let handle = h.collector.handle();
        let sound = SoundEffect::new(&handle, EffectSource::new(48000, Channels::Mono, vec![0.4; 4]));
        h.mixer.play(sound.create_instance(&handle, SoundGroup::Ui));
        h.mixer.play(sound.create_instance(&handle, SoundGroup::Voice));

        let out = h.run(1);
        assert_eq!(out[0].left, 0.4);
    }

    #[test]
    fn test_first_music_starts_immediately() {
        let mut h = Harness::new(4, 0.01);
        let track = h.music(&[0.5; 16]);
        h.mixer.set_music(track.clone());

        assert_eq!(h.mixer.current_music(), Some(&track));
        let out = h.run(4);
        assert_eq!(out[0], StereoSample::new(0.5, 0.5));
        assert_eq!(track.position(), 4);

        let events = h.drain_events();
        assert!(matches!(
            events.as_slice(),
            [MixerEvent::MusicChanged(Some(t))] if *t == track
        ));
    }

    #[test]
    fn test_crossfade_commits_after_ceil_inverse_step() {
        let mut h = Harness::new(4, 0.01);
        let a = h.music(&[0.5; 64]);
        let b = h.music(&[0.25; 64]);
        h.mixer.set_music(a.clone());
        h.drain_events();

        h.mixer.set_music(b.clone());
        assert_eq!(h.mixer.pending_music(), Some(&b));

        for _ in 0..99 {
            h.run(2);
        }
        assert_eq!(h.mixer.current_music(), Some(&a));
        assert!(h.mixer.fade_multiplier() > 0.0);

        h.run(2);
        assert_eq!(h.mixer.fade_multiplier(), 0.0);
        assert_eq!(h.mixer.current_music(), Some(&b));
        let events = h.drain_events();
        assert!(matches!(
            events.as_slice(),
            [MixerEvent::MusicChanged(Some(t))] if *t == b
        ));

        // And back up over the same number of callbacks
        for _ in 0..99 {
            h.run(2);
        }
        assert!(h.mixer.fade_multiplier() < 1.0);
        h.run(2);
        assert_eq!(h.mixer.fade_multiplier(), 1.0);
        assert_eq!(h.mixer.params().fade_multiplier(), 1.0);
    }

    #[test]
    fn test_new_track_starts_from_beginning() {
        let mut h = Harness::new(4, 1.0);
        let a = h.music(&[0.5; 64]);
        let b = h.music(&[0.1, 0.2, 0.3, 0.4]);
        h.mixer.set_music(a);

        // Move b's stream off its start first
        {
            let mut reader = b.try_reader().unwrap();
            reader.next_sample();
        }
        h.mixer.set_music(b.clone());
        h.run(1);
        assert_eq!(h.mixer.current_music(), Some(&b));

        // Fade rises by a full step per callback at speed 1.0
        let out = h.run(1);
        assert_eq!(out[0].left, 0.1);
        let out = h.run(2);
        assert_eq!(out[1].left, 0.3);
        assert_eq!(b.position(), 3);
    }

    #[test]
    fn test_setting_current_track_cancels_crossfade() {
        let mut h = Harness::new(4, 0.1);
        let a = h.music(&[0.5; 64]);
        let b = h.music(&[0.5; 64]);
        h.mixer.set_music(a.clone());
        h.mixer.set_music(b);
        h.run(1);
        h.run(1);
        let faded = h.mixer.fade_multiplier();
        assert!(faded < 1.0);

        h.mixer.set_music(a.clone());
        h.run(1);
        assert!(h.mixer.fade_multiplier() > faded);
        assert_eq!(h.mixer.current_music(), Some(&a));
        assert_eq!(h.mixer.pending_music(), Some(&a));
    }

    #[test]
    fn test_reset_music_restarts_current_at_full_level() {
        let mut h = Harness::new(4, 0.1);
        let ramp: Vec<f32> = (1..=16).map(|i| i as f32 * 0.05).collect();
        let a = h.music(&ramp);
        let b = h.music(&[0.5; 64]);
        h.mixer.set_music(a.clone());
        h.mixer.set_music(b);
        h.run(3);
        assert!(h.mixer.fade_multiplier() < 1.0);
        h.drain_events();

        h.mixer.reset_music();
        let out = h.run(2);
        assert_eq!(out[0].left, 0.05);
        assert_eq!(out[1].left, 0.1);
        assert_eq!(h.mixer.fade_multiplier(), 1.0);
        assert_eq!(h.mixer.current_music(), Some(&a));
        assert_eq!(h.mixer.pending_music(), Some(&a));
        assert!(h.drain_events().is_empty());
    }

    #[test]
    fn test_reset_music_without_track_is_noop() {
        let mut h = Harness::new(4, 0.1);
        h.mixer.reset_music();
        let out = h.run(4);
        assert!(out.iter().all(|frame| *frame == StereoSample::silence()));
        assert!(h.mixer.current_music().is_none());
        assert!(h.drain_events().is_empty());
    }

    #[test]
    fn test_pause_silences_music_and_holds_fade() {
        let mut h = Harness::new(4, 0.1);
        let a = h.music(&[0.5; 64]);
        let b = h.music(&[0.5; 64]);
        h.mixer.set_music(a.clone());
        h.mixer.set_music(b);
        h.run(1);
        let held = h.mixer.fade_multiplier();

        h.mixer.params().set_music_paused(true);
        let position = a.position();
        let out = h.run(8);
        assert!(out.iter().all(|frame| *frame == StereoSample::silence()));
        assert_eq!(h.mixer.fade_multiplier(), held);
        assert_eq!(a.position(), position);

        h.mixer.params().set_music_paused(false);
        h.run(1);
        assert!(h.mixer.fade_multiplier() < held);
    }

    #[test]
    fn test_stop_music_fades_to_silence() {
        let mut h = Harness::new(4, 0.5);
        let a = h.music(&[0.5; 64]);
        h.mixer.set_music(a);
        h.drain_events();

        h.mixer.stop_music();
        h.run(1);
        h.run(1);
        assert!(h.mixer.current_music().is_none());
        assert!(matches!(
            h.drain_events().as_slice(),
            [MixerEvent::MusicChanged(None)]
        ));

        let out = h.run(4);
        assert!(out.iter().all(|frame| *frame == StereoSample::silence()));
    }

    #[test]
    fn test_unlooped_music_ends() {
        let mut h = Harness::new(4, 0.01);
        let track = h.music(&[0.5; 4]);
        track.set_looped(false);
        h.mixer.set_music(track.clone());
        h.drain_events();

        let out = h.run(6);
        assert_eq!(out[3].left, 0.5);
        assert_eq!(out[4], StereoSample::silence());
        assert_eq!(out[5], StereoSample::silence());
        assert!(h.mixer.current_music().is_none());
        assert!(h.mixer.pending_music().is_none());
        assert!(matches!(
            h.drain_events().as_slice(),
            [MixerEvent::MusicEnded(t)] if *t == track
        ));
    }

    #[test]
    fn test_looped_music_wraps() {
        let mut h = Harness::new(4, 0.01);
        let track = h.music(&[0.1, 0.2, 0.3]);
        h.mixer.set_music(track);
        let out = h.run(7);
        let lefts: Vec<f32> = out.iter().map(|f| f.left).collect();
        assert_eq!(lefts, vec![0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.1]);
    }

    #[test]
    fn test_odd_tail_is_zeroed() {
        let mut h = Harness::new(4, 0.01);
        let instance = h.effect(Channels::Mono, vec![0.5; 8]);
        instance.set_looped(true);
        h.mixer.play(instance);

        let mut buffer = [9.0_f32; 5];
        h.mixer.process(&mut buffer);
        assert_eq!(buffer, [0.5, 0.5, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_processor_applies_queued_commands_first() {
        let h = Harness::new(4, 0.01);
        let instance = h.effect(Channels::Mono, vec![0.3; 8]);
        let (tx, rx) = command_channel();
        let mut sender = CommandSender::new(tx);
        let mut processor = MixerProcessor::new(h.mixer, rx);

        sender.send(MixerCommand::Play(instance.clone())).unwrap();
        let mut buffer = [0.0_f32; 4];
        processor.process(&mut buffer);
        assert_eq!(buffer, [0.3, 0.3, 0.3, 0.3]);
        assert!(processor.mixer().is_active(instance.id()));

        sender.send(MixerCommand::Stop(instance.id())).unwrap();
        processor.process(&mut buffer);
        assert_eq!(buffer, [0.0; 4]);
        assert_eq!(processor.mixer().params().active_effects(), 0);
    }

    #[test]
    fn test_full_event_queue_counts_drops() {
        let mut h = Harness::new(4, 0.01);
        // Leave the event consumer undrained while effects keep ending
        for _ in 0..(crate::engine::EVENT_QUEUE_CAPACITY + 3) {
            let instance = h.effect(Channels::Mono, vec![0.1]);
            h.mixer.play(instance);
            h.run(1);
        }
        assert_eq!(h.mixer.params().dropped_events(), 3);
    }
}
