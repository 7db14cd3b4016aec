//! Decoded audio sources
//!
//! Two kinds of source are consumed by the mixer, both produced by the
//! (external) import pipeline at the canonical sample rate:
//!
//! - [`EffectSource`]: a fully materialized, immutable sample array with O(1)
//!   random access. Shared read-only by any number of effect instances.
//! - [`MusicSource`]: a rewindable sequential reader over a backing resource
//!   (file or memory) holding little-endian `f32` samples after a header.
//!   Reading wraps back to the start-of-audio marker when the data runs out.
//!
//! Sample values are expected to be normalized to [-1, 1]; the engine never
//! re-normalizes.

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use thiserror::Error;

use crate::types::{duration_secs, Channels, Sample};

/// Size in bytes of one encoded sample in a music stream
pub const BYTES_PER_SAMPLE: u64 = 4;

/// Errors that can occur while building a source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The backing resource could not be read or seeked
    #[error("Failed to access audio data: {0}")]
    Io(#[from] std::io::Error),

    /// The start-of-audio marker lies beyond the end of the resource
    #[error("Start of audio at byte {start} is past the end of the stream ({end} bytes)")]
    InvalidStartOfAudio { start: u64, end: u64 },

    /// Channel count other than mono or stereo
    #[error("Unsupported channel count: {0}")]
    UnsupportedChannelCount(u16),
}

/// Map a raw channel count from the import pipeline to a layout
pub fn channels_from_count(count: u16) -> Result<Channels, SourceError> {
    Channels::from_count(count).ok_or(SourceError::UnsupportedChannelCount(count))
}

/// In-memory sound effect data
#[derive(Debug, Clone)]
pub struct EffectSource {
    sample_rate: u32,
    channels: Channels,
    samples: Vec<Sample>,
}

impl EffectSource {
    /// Create an effect source from decoded samples
    pub fn new(sample_rate: u32, channels: Channels, samples: Vec<Sample>) -> Self {
        debug_assert!(
            samples.iter().all(|s| (-1.0..=1.0).contains(s)),
            "effect samples must be pre-normalized to [-1, 1]"
        );
        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    /// Sample rate of the decoded data
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel layout of the decoded data
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of samples available
    #[inline]
    pub fn len(&self) -> u64 {
        self.samples.len() as u64
    }

    /// Whether the source holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        duration_secs(self.len(), self.channels, self.sample_rate)
    }

    /// Sample at `index`
    ///
    /// # Panics
    /// Panics if `index >= self.len()`. The mixer never reads out of range:
    /// instance cursors wrap before reaching the end.
    #[inline]
    pub fn sample(&self, index: u64) -> Sample {
        self.samples[index as usize]
    }

    /// Sample at `index`, or `None` when out of range
    pub fn get(&self, index: u64) -> Option<Sample> {
        self.samples.get(index as usize).copied()
    }
}

/// Anything a music stream can be read from
pub trait SampleReader: Read + Seek + Send {}

impl<T: Read + Seek + Send> SampleReader for T {}

/// Streaming music data read sample by sample
///
/// There is no random access: the read position lives inside the reader.
/// The stream rewinds itself when exhausted (wrap-on-read).
pub struct MusicSource {
    sample_rate: u32,
    channels: Channels,
    /// Samples between the start-of-audio marker and the end of the resource
    length: u64,
    /// Byte offset where the header ends and sample data begins
    start_of_audio: u64,
    /// Samples consumed since the last rewind
    position: u64,
    reader: Box<dyn SampleReader>,
}

impl MusicSource {
    /// Create a music source over an arbitrary reader
    ///
    /// `start_of_audio` is the byte offset of the first sample. The length is
    /// measured from the resource size; a trailing partial sample is ignored.
    pub fn new<R>(
        sample_rate: u32,
        channels: Channels,
        mut reader: R,
        start_of_audio: u64,
    ) -> Result<Self, SourceError>
    where
        R: SampleReader + 'static,
    {
        let end = reader.seek(SeekFrom::End(0))?;
        if start_of_audio > end {
            return Err(SourceError::InvalidStartOfAudio {
                start: start_of_audio,
                end,
            });
        }
        reader.seek(SeekFrom::Start(start_of_audio))?;

        Ok(Self {
            sample_rate,
            channels,
            length: (end - start_of_audio) / BYTES_PER_SAMPLE,
            start_of_audio,
            position: 0,
            reader: Box::new(reader),
        })
    }

    /// Open a music file whose sample data starts at `start_of_audio`
    ///
    /// The whole file is read into memory here, so the audio callback never
    /// touches the filesystem. Use [`MusicSource::new`] to stream from a
    /// reader of your own.
    pub fn open(
        path: &Path,
        sample_rate: u32,
        channels: Channels,
        start_of_audio: u64,
    ) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        log::debug!("Loaded music stream {:?} ({} bytes)", path, bytes.len());
        Self::new(sample_rate, channels, Cursor::new(bytes), start_of_audio)
    }

    /// Create an in-memory music stream from decoded samples
    pub fn from_samples(sample_rate: u32, channels: Channels, samples: &[Sample]) -> Self {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self {
            sample_rate,
            channels,
            length: samples.len() as u64,
            start_of_audio: 0,
            position: 0,
            reader: Box::new(Cursor::new(bytes)),
        }
    }

    /// Sample rate of the decoded data
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel layout of the decoded data
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of samples in the stream
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Whether the stream holds no samples
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Byte offset of the first sample in the backing resource
    pub fn start_of_audio(&self) -> u64 {
        self.start_of_audio
    }

    /// Samples consumed since the last rewind
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f32 {
        duration_secs(self.length, self.channels, self.sample_rate)
    }

    /// Seek back to the start-of-audio marker
    pub fn reset_position(&mut self) -> std::io::Result<()> {
        self.position = 0;
        self.reader.seek(SeekFrom::Start(self.start_of_audio))?;
        Ok(())
    }

    /// Read the next sample
    ///
    /// Returns the sample and whether the stream wrapped back to the start
    /// after this read. Read failures yield silence and force a rewind, so
    /// a broken resource degrades to a silent loop instead of an error.
    pub fn next_sample(&mut self) -> (Sample, bool) {
        if self.length == 0 {
            return (0.0, true);
        }

        let mut bytes = [0u8; BYTES_PER_SAMPLE as usize];
        let (value, failed) = match self.reader.read_exact(&mut bytes) {
            Ok(()) => (Sample::from_le_bytes(bytes), false),
            Err(_) => (0.0, true),
        };

        self.position += 1;
        let wrapped = failed || self.position >= self.length;
        if wrapped {
            // A failed seek shows up as another failed read on the next call
            let _ = self.reset_position();
        }

        (value, wrapped)
    }
}

impl std::fmt::Debug for MusicSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicSource")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("length", &self.length)
            .field("start_of_audio", &self.start_of_audio)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
