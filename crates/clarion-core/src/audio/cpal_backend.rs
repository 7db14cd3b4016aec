//! CPAL output backend
//!
//! Opens one output stream and moves the [`MixerProcessor`] into its data
//! callback, so the audio thread owns the mixer outright and no lock sits
//! between the two threads.
//!
//! ```text
//! ┌──────────────────┐                     ┌─────────────────────┐
//! │   Game Thread    │───push()───────────►│   Command Queue     │
//! │  (AudioManager)  │                     │  (lock-free SPSC)   │
//! └──────────────────┘                     └──────────┬──────────┘
//!      ▲       │                                      │ pop()
//!      │       │ Relaxed atomics                      ▼
//!      │       ▼                           ┌─────────────────────┐
//!      │ ┌──────────────────┐              │  CPAL Audio Thread  │
//!      │ │   MixerParams    │◄─────────────│  (owns the Mixer)   │
//!      │ └──────────────────┘   mirrors    └──────────┬──────────┘
//!      │                                              │ push()
//!      └──────────────pop() (update)──────────────────┘ Event Queue
//! ```

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig, SupportedStreamConfigRange};

use super::config::{AudioConfig, MAX_BUFFER_SIZE};
use super::device::{default_output_device, find_device_by_id};
use super::error::{AudioError, AudioResult};
use crate::engine::MixerProcessor;
use crate::types::OUTPUT_CHANNELS;

/// A running output stream
///
/// Keeps the stream alive. Dropping the handle pauses and closes the stream,
/// after which the mixer callback is never invoked again.
pub struct AudioHandle {
    stream: Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
    buffer_size: u32,
}

impl AudioHandle {
    /// Name of the device being played to
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Negotiated sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the device stream
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Requested period in frames
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// One-way output latency in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stream.pause() {
            log::debug!("Failed to pause output stream on shutdown: {}", e);
        }
        log::info!("Audio stream closed ({})", self.device_name);
    }
}

/// Open the configured output device and start driving `processor`
pub fn start_output(config: &AudioConfig, processor: MixerProcessor) -> AudioResult<AudioHandle> {
    let device = match &config.device {
        Some(id) => find_device_by_id(id)?,
        None => default_output_device()?,
    };
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    log::info!("Using audio device: {}", device_name);

    let supported: Vec<ConfigCandidate> = device
        .supported_output_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?
        .map(|range| ConfigCandidate::from(&range))
        .collect();
    let (chosen, sample_rate) = choose_output_config(&supported, config.sample_rate)?;

    if sample_rate != config.sample_rate {
        log::warn!(
            "Audio device doesn't support {}Hz, using {}Hz (sources will play off-pitch)",
            config.sample_rate,
            sample_rate
        );
    }

    let buffer_size = config.buffer_size.frames();
    let stream_config = StreamConfig {
        channels: chosen.channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Fixed(buffer_size),
    };

    log::info!(
        "Audio config: {} channels, {}Hz, {} frames (~{:.1}ms latency)",
        stream_config.channels,
        sample_rate,
        buffer_size,
        config.buffer_size.latency_ms(sample_rate)
    );

    let stream = build_output_stream(&device, &stream_config, processor)?;
    stream
        .play()
        .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;
    log::info!("Audio stream started");

    Ok(AudioHandle {
        stream,
        device_name,
        sample_rate,
        channels: stream_config.channels,
        buffer_size,
    })
}

/// The parts of a supported configuration range the selection looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConfigCandidate {
    channels: u16,
    format: SampleFormat,
    min_rate: u32,
    max_rate: u32,
}

impl ConfigCandidate {
    fn has_rate(&self, rate: u32) -> bool {
        (self.min_rate..=self.max_rate).contains(&rate)
    }
}

impl From<&SupportedStreamConfigRange> for ConfigCandidate {
    fn from(range: &SupportedStreamConfigRange) -> Self {
        Self {
            channels: range.channels(),
            format: range.sample_format(),
            min_rate: range.min_sample_rate().0,
            max_rate: range.max_sample_rate().0,
        }
    }
}

/// Pick a 32-bit float configuration, preferring stereo at the target rate
///
/// Returns the chosen candidate and the sample rate to open it at.
fn choose_output_config(
    supported: &[ConfigCandidate],
    target_rate: u32,
) -> AudioResult<(ConfigCandidate, u32)> {
    if supported.is_empty() {
        return Err(AudioError::ConfigError(
            "No supported output configurations".to_string(),
        ));
    }

    let float_configs: Vec<ConfigCandidate> = supported
        .iter()
        .copied()
        .filter(|c| c.format == SampleFormat::F32 && c.channels >= 1)
        .collect();

    let at_rate = || float_configs.iter().filter(move |c| c.has_rate(target_rate));
    let best = at_rate()
        .find(|c| c.channels as usize == OUTPUT_CHANNELS)
        .or_else(|| at_rate().find(|c| c.channels >= 2))
        .or_else(|| at_rate().next())
        .or_else(|| float_configs.first())
        .copied()
        .ok_or_else(|| {
            AudioError::UnsupportedFormat("device offers no 32-bit float output".to_string())
        })?;

    let sample_rate = if best.has_rate(target_rate) {
        target_rate
    } else {
        best.max_rate
    };

    Ok((best, sample_rate))
}

/// Build the output stream that owns the processor
fn build_output_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut processor: MixerProcessor,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;
    // Only used when the device is not stereo; sized once, never grown
    let mut scratch = if channels == OUTPUT_CHANNELS {
        Vec::new()
    } else {
        vec![0.0_f32; MAX_BUFFER_SIZE as usize * OUTPUT_CHANNELS]
    };

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                if channels == OUTPUT_CHANNELS {
                    processor.process(data);
                } else {
                    write_to_device_layout(&mut processor, &mut scratch, data, channels);
                }
            },
            move |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))
}

/// Mix into the stereo scratch buffer and copy into a device frame layout
///
/// Mono devices get the left channel (left and right carry the same value);
/// devices with more channels get the mix on their first two and silence on
/// the rest.
fn write_to_device_layout(
    processor: &mut MixerProcessor,
    scratch: &mut [f32],
    data: &mut [f32],
    channels: usize,
) {
    let chunk_frames = scratch.len() / OUTPUT_CHANNELS;
    if channels == 0 || chunk_frames == 0 {
        data.fill(0.0);
        return;
    }

    for chunk in data.chunks_mut(chunk_frames * channels) {
        let frames = chunk.len() / channels;
        let mixed = &mut scratch[..frames * OUTPUT_CHANNELS];
        processor.process(mixed);

        for (out, pair) in chunk.chunks_mut(channels).zip(mixed.chunks(OUTPUT_CHANNELS)) {
            out.fill(0.0);
            let n = out.len().min(OUTPUT_CHANNELS);
            out[..n].copy_from_slice(&pair[..n]);
        }
    }
}
