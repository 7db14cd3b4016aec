//! Synthesized demo material
//!
//! The player ships no audio assets, so effects and music loops are
//! generated as mono sample buffers at the mixer's rate.

use std::f32::consts::TAU;

/// A decaying sine blip
pub fn blip(sample_rate: u32, freq: f32, length_secs: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * length_secs) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let envelope = 1.0 - i as f32 / len as f32;
            0.4 * envelope * envelope * (TAU * freq * t).sin()
        })
        .collect()
}

/// A loop cycling through chords, one per second
///
/// Each chord is a set of frequencies summed with equal weight. The loop
/// length is rounded to whole chords so it repeats seamlessly.
pub fn chord_loop(sample_rate: u32, chords: &[&[f32]], length_secs: f32) -> Vec<f32> {
    let chord_len = sample_rate as usize;
    let n_chords = (length_secs.max(1.0).round() as usize).max(1);

    (0..n_chords * chord_len)
        .map(|i| {
            let Some(chord) = chords.get((i / chord_len) % chords.len().max(1)) else {
                return 0.0;
            };
            if chord.is_empty() {
                return 0.0;
            }
            let t = i as f32 / sample_rate as f32;
            // Short ramps at chord edges avoid clicks
            let pos = i % chord_len;
            let edge = pos.min(chord_len - pos) as f32 / (sample_rate as f32 * 0.01);
            let ramp = edge.min(1.0);
            let sum: f32 = chord.iter().map(|f| (TAU * f * t).sin()).sum();
            0.3 * ramp * sum / chord.len() as f32
        })
        .collect()
}

/// C major / A minor / F major / G major
pub const PROGRESSION_A: [&[f32]; 4] = [
    &[261.63, 329.63, 392.00],
    &[220.00, 261.63, 329.63],
    &[174.61, 220.00, 261.63],
    &[196.00, 246.94, 293.66],
];

/// D minor / B flat major
pub const PROGRESSION_B: [&[f32]; 2] = [&[146.83, 174.61, 220.00], &[116.54, 146.83, 174.61]];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blip_decays_to_silence() {
        let samples = blip(1000, 100.0, 0.5);
        assert_eq!(samples.len(), 500);
        assert!(samples.iter().all(|s| s.abs() <= 0.4));
        assert!(samples[499].abs() < 1e-3);
    }

    #[test]
    fn test_chord_loop_whole_seconds() {
        let samples = chord_loop(1000, &PROGRESSION_A, 2.4);
        assert_eq!(samples.len(), 2000);
        assert_eq!(samples[0], 0.0);
        assert!(samples.iter().all(|s| s.abs() <= 0.3));
    }
}
