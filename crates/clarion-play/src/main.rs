//! Clarion Player - demo driver for the Clarion mixer
//!
//! Synthesizes a few effects and two music loops, then runs a short script
//! against the mixer: periodic effects, a playlist crossfade, a music pause
//! and a final fade-out.
//!
//! ## Command line flags
//!
//! - `--render <path>`: render offline to a WAV file instead of the device
//! - `--config <path>`: use a specific configuration file
//! - `--list-devices`: print the available output devices and exit

mod config;
mod synth;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use clarion_core::audio::output_devices;
use clarion_core::render::render_to_wav;
use clarion_core::{AudioManager, Channels, EffectInstance, EffectSource, MusicSource, SoundGroup};

use config::{DemoConfig, PlayerConfig};

/// Control-loop tick for live playback
const UPDATE_INTERVAL: Duration = Duration::from_millis(10);

struct Args {
    render: Option<PathBuf>,
    config: Option<PathBuf>,
    list_devices: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        render: None,
        config: None,
        list_devices: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--render" => {
                args.render = Some(iter.next().context("--render needs a path")?.into());
            }
            "--config" => {
                args.config = Some(iter.next().context("--config needs a path")?.into());
            }
            "--list-devices" => args.list_devices = true,
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(args)
}

/// Time-driven playback script
struct Demo {
    config: DemoConfig,
    effects: Vec<EffectInstance>,
    next_effect_at: f32,
    effect_index: usize,
    started: bool,
    switched: bool,
    stopped: bool,
}

impl Demo {
    fn new(audio: &mut AudioManager, config: DemoConfig) -> Self {
        let rate = audio.config().sample_rate;

        let effects = [(880.0, SoundGroup::Effects), (660.0, SoundGroup::Ui), (1320.0, SoundGroup::Effects)]
            .into_iter()
            .map(|(freq, group)| {
                let sound = audio.load_effect(EffectSource::new(
                    rate,
                    Channels::Mono,
                    synth::blip(rate, freq, 0.2),
                ));
                let instance = audio.create_instance(&sound, group);
                instance.set_on_end(move || log::debug!("{}Hz blip finished", freq));
                instance
            })
            .collect();

        for progression in [&synth::PROGRESSION_A[..], &synth::PROGRESSION_B[..]] {
            let samples = synth::chord_loop(rate, progression, config.track_length_secs);
            let track = audio.load_music(MusicSource::from_samples(rate, Channels::Mono, &samples));
            audio.add_music(&track);
        }

        audio.on_music_change(|track| match track {
            Some(track) => log::info!("Now playing track {} ({:.1}s)", track.id(), track.duration_secs()),
            None => log::info!("Music stopped"),
        });

        Self {
            config,
            effects,
            next_effect_at: 0.0,
            effect_index: 0,
            started: false,
            switched: false,
            stopped: false,
        }
    }

    fn step(&mut self, audio: &mut AudioManager, t: f32) {
        let duration = self.config.duration_secs;
        if !self.started {
            self.started = true;
            log::info!("Demo running for {:.1}s", duration);
        }

        if t >= self.next_effect_at && !self.effects.is_empty() {
            let instance = &self.effects[self.effect_index % self.effects.len()];
            audio.play(instance);
            self.effect_index += 1;
            self.next_effect_at += self.config.effect_interval_secs.max(0.05);
        }

        if !self.switched && t >= duration * 0.3 {
            self.switched = true;
            log::info!("Crossfading to the next track");
            audio.next_music();
        }

        let pause = t >= duration * 0.55 && t < duration * 0.65;
        if pause != audio.is_music_paused() {
            log::info!("Music {}", if pause { "paused" } else { "resumed" });
            audio.set_music_paused(pause);
        }

        if !self.stopped && t >= duration * 0.85 {
            self.stopped = true;
            log::info!("Fading out");
            audio.clear_playlist();
        }
    }
}

fn run_live(player: &PlayerConfig) -> Result<()> {
    let mut audio = AudioManager::start(&player.mixer, &player.audio)
        .context("Failed to open audio output")?;
    if let Some(output) = audio.output() {
        log::info!(
            "Playing on {} ({}Hz, ~{:.1}ms latency)",
            output.device_name(),
            output.sample_rate(),
            output.latency_ms()
        );
    }

    let mut demo = Demo::new(&mut audio, player.demo.clone());
    let start = Instant::now();
    loop {
        let t = start.elapsed().as_secs_f32();
        if t >= player.demo.duration_secs {
            break;
        }
        demo.step(&mut audio, t);
        audio.update();
        std::thread::sleep(UPDATE_INTERVAL);
    }

    log::info!(
        "Done ({} events dropped)",
        audio.params().dropped_events()
    );
    Ok(())
}

fn run_offline(player: &PlayerConfig, path: &Path) -> Result<()> {
    let (mut audio, mut processor) = AudioManager::detached(&player.mixer);
    let rate = audio.config().sample_rate as f32;
    let period = player.audio.buffer_size.frames() as usize;

    let mut demo = Demo::new(&mut audio, player.demo.clone());
    let stats = render_to_wav(
        &mut audio,
        &mut processor,
        path,
        player.demo.duration_secs,
        period,
        |audio, frame| demo.step(audio, frame as f32 / rate),
    )?;

    println!(
        "Rendered {:.1}s to {} (peak {:.3})",
        stats.duration_secs(audio.config().sample_rate),
        path.display(),
        stats.peak
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = parse_args()?;

    // Initialize logger - set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if args.list_devices {
        for device in output_devices()? {
            println!("{}  rates: {:?}", device, device.sample_rates);
        }
        return Ok(());
    }

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let player: PlayerConfig = config::load_config(&config_path);
    if !config_path.exists() {
        // First run: leave an editable copy of the defaults behind
        if let Err(e) = config::save_config(&player, &config_path) {
            log::warn!("Could not write default config: {:#}", e);
        }
    }
    log::info!("clarion-play starting up (config: {:?})", config_path);

    match &args.render {
        Some(path) => run_offline(&player, path),
        None => run_live(&player),
    }
}
