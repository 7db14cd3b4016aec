//! Saturating summation of source samples into the stereo output
//!
//! Every source contributes one mono value per frame, written identically to
//! left and right. Stereo sources are halved before accumulation and each
//! channel is clamped to [-1, 1] after every addition, so the result depends
//! on accumulation order only once a channel saturates.

use crate::types::{Channels, Sample, StereoSample};

/// Attenuation applied to sources with a stereo layout
pub const STEREO_HEADROOM: Sample = 0.5;

/// Accumulate one source sample into an output frame
///
/// `volume` is the per-source gain (group and instance volume for effects;
/// music volume, fade multiplier and track volume for music).
#[inline]
pub fn mix_sample(
    frame: &mut StereoSample,
    raw: Sample,
    master: Sample,
    volume: Sample,
    channels: Channels,
) {
    let mut scaled = raw * master * volume;
    if channels == Channels::Stereo {
        scaled *= STEREO_HEADROOM;
    }
    frame.left = saturate(frame.left + scaled);
    frame.right = saturate(frame.right + scaled);
}

#[inline]
fn saturate(value: Sample) -> Sample {
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_passes_through() {
        let mut frame = StereoSample::silence();
        mix_sample(&mut frame, 0.4, 1.0, 1.0, Channels::Mono);
        assert_eq!(frame, StereoSample::new(0.4, 0.4));
    }

    #[test]
    fn test_stereo_is_halved_on_both_channels() {
        for raw in [-1.0_f32, -0.6, 0.0, 0.3, 1.0] {
            let mut frame = StereoSample::silence();
            mix_sample(&mut frame, raw, 1.0, 1.0, Channels::Stereo);
            assert_eq!(frame.left, raw * 0.5);
            assert_eq!(frame.right, frame.left);
            assert!(frame.left.abs() <= 1.0_f32.min(raw.abs() * 0.5));
        }
    }

    #[test]
    fn test_gains_multiply() {
        let mut frame = StereoSample::silence();
        mix_sample(&mut frame, 0.8, 0.5, 0.5, Channels::Mono);
        assert_eq!(frame.left, 0.8 * 0.5 * 0.5);
    }

    #[test]
    fn test_clamps_after_every_add() {
        let mut frame = StereoSample::silence();
        mix_sample(&mut frame, 0.9, 1.0, 1.0, Channels::Mono);
        mix_sample(&mut frame, 0.9, 1.0, 1.0, Channels::Mono);
        assert_eq!(frame.left, 1.0);
        // Saturated first, so the negative contribution starts from 1.0
        mix_sample(&mut frame, -0.5, 1.0, 1.0, Channels::Mono);
        assert_eq!(frame.left, 0.5);
    }

    #[test]
    fn test_many_sources_stay_in_range() {
        let mut frame = StereoSample::silence();
        for i in 0..64 {
            let raw = if i % 3 == 0 { -1.0 } else { 1.0 };
            mix_sample(&mut frame, raw, 1.0, 1.0, Channels::Mono);
            assert!((-1.0..=1.0).contains(&frame.left));
            assert!((-1.0..=1.0).contains(&frame.right));
        }
    }
}
