//! Offline rendering to WAV
//!
//! Drives a detached [`MixerProcessor`] period by period, exactly as a
//! device callback would, and writes the interleaved stereo output as a
//! 32-bit float WAV file. Useful for checking mixes without audio hardware.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::engine::MixerProcessor;
use crate::manager::AudioManager;
use crate::types::{StereoSample, OUTPUT_CHANNELS};

/// Summary of a finished render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    /// Stereo frames written
    pub frames: u64,
    /// Mixer callbacks performed
    pub periods: u64,
    /// Largest absolute sample value in the output
    pub peak: f32,
}

impl RenderStats {
    /// Rendered length in seconds
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.frames as f32 / sample_rate as f32
    }
}

/// Render `duration_secs` of output to a WAV file at `path`
///
/// Before each period `on_period` receives the manager and the index of the
/// first frame of that period, so a caller can script playback over time.
/// `manager.update()` runs after the script on every period.
pub fn render_to_wav<F>(
    manager: &mut AudioManager,
    processor: &mut MixerProcessor,
    path: &Path,
    duration_secs: f32,
    period_frames: usize,
    on_period: F,
) -> Result<RenderStats>
where
    F: FnMut(&mut AudioManager, u64),
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let stats = render_into(
        manager,
        processor,
        BufWriter::new(file),
        duration_secs,
        period_frames,
        on_period,
    )?;

    log::info!(
        "Rendered {} frames ({} periods, peak {:.3}) to {}",
        stats.frames,
        stats.periods,
        stats.peak,
        path.display()
    );
    Ok(stats)
}

fn render_into<W, F>(
    manager: &mut AudioManager,
    processor: &mut MixerProcessor,
    writer: W,
    duration_secs: f32,
    period_frames: usize,
    mut on_period: F,
) -> Result<RenderStats>
where
    W: Write + std::io::Seek,
    F: FnMut(&mut AudioManager, u64),
{
    let sample_rate = processor.mixer().sample_rate();
    let spec = WavSpec {
        channels: OUTPUT_CHANNELS as u16,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut wav = WavWriter::new(writer, spec).context("Failed to create WAV writer")?;

    let total_frames = (duration_secs.max(0.0) as f64 * sample_rate as f64).round() as u64;
    let period_frames = period_frames.max(1);
    let mut buffer = vec![StereoSample::silence(); period_frames];
    let mut stats = RenderStats {
        frames: 0,
        periods: 0,
        peak: 0.0,
    };

    while stats.frames < total_frames {
        on_period(manager, stats.frames);
        manager.update();

        let n = (total_frames - stats.frames).min(period_frames as u64) as usize;
        let period = &mut buffer[..n];
        processor.process_frames(period);

        for frame in period.iter() {
            stats.peak = stats.peak.max(frame.peak());
            wav.write_sample(frame.left)
                .context("Failed to write WAV sample")?;
            wav.write_sample(frame.right)
                .context("Failed to write WAV sample")?;
        }

        stats.frames += n as u64;
        stats.periods += 1;
    }

    // Deliver whatever the last period reported
    manager.update();
    wav.finalize().context("Failed to finalize WAV file")?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MixerConfig;
    use crate::group::SoundGroup;
    use crate::source::EffectSource;
    use crate::types::Channels;

    fn detached(sample_rate: u32) -> (AudioManager, MixerProcessor) {
        AudioManager::detached(&MixerConfig {
            sample_rate,
            ..MixerConfig::default()
        })
    }

    #[test]
    fn test_render_writes_stereo_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let (mut audio, mut processor) = detached(1000);

        let sound = audio.load_effect(EffectSource::new(1000, Channels::Mono, vec![0.25; 100]));
        let instance = audio.create_instance(&sound, SoundGroup::Effects);

        let stats = render_to_wav(&mut audio, &mut processor, &path, 0.5, 64, |audio, frame| {
            if frame == 0 {
                audio.play(&instance);
            }
        })
        .unwrap();

        assert_eq!(stats.frames, 500);
        assert_eq!(stats.periods, 8);
        assert_eq!(stats.peak, 0.25);
        assert_eq!(stats.duration_secs(1000), 0.5);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 1000);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 1000);
        assert!(samples[..200].iter().all(|&s| s == 0.25));
        assert!(samples[200..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_render_delivers_completion_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.wav");
        let (mut audio, mut processor) = detached(1000);

        let sound = audio.load_effect(EffectSource::new(1000, Channels::Mono, vec![0.1; 10]));
        let instance = audio.create_instance(&sound, SoundGroup::Ui);
        let ended = std::rc::Rc::new(std::cell::Cell::new(0));
        let sink = ended.clone();
        audio.on_effect_end(move |_| sink.set(sink.get() + 1));

        render_to_wav(&mut audio, &mut processor, &path, 0.01, 10, |audio, frame| {
            if frame == 0 {
                audio.play(&instance);
            }
        })
        .unwrap();

        assert_eq!(ended.get(), 1);
    }

    #[test]
    fn test_zero_duration_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        let (mut audio, mut processor) = detached(48000);

        let stats = render_to_wav(&mut audio, &mut processor, &path, 0.0, 256, |_, _| {}).unwrap();
        assert_eq!(stats.frames, 0);
        assert_eq!(stats.periods, 0);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
