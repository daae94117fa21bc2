//! Spectral analysis of PCM into 72 semitone bands, A0 upwards.

use std::borrow::Cow;
use std::f64::consts::PI;
use std::sync::Arc;

use log::trace;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::analysis::profile::BANDS;

/// The input is low-pass filtered and decimated by this factor before analysis.
pub const DOWNSAMPLE_FACTOR: usize = 4;
pub const FRAME_SIZE: usize = 16384;
pub const HOP_SIZE: usize = 4096;
/// Centre frequency of band 0 (A0).
pub const STARTING_FREQUENCY: f64 = 27.5;

const LOW_PASS_TAPS: usize = 63;

/// Reusable FFT plan and analysis window.
pub struct Chromagram {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
}

impl Default for Chromagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Chromagram {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(FRAME_SIZE);

        Self {
            fft,
            window: blackman(FRAME_SIZE),
        }
    }

    /// One 72-band vector per analysis frame.
    ///
    /// Each band holds the strongest FFT magnitude among the bins closest to its
    /// semitone. A signal shorter than one frame is zero padded to a single frame.
    pub fn frames(&self, samples: &[f32], frame_rate: u32) -> Vec<[f64; BANDS]> {
        if samples.is_empty() || frame_rate == 0 {
            return Vec::new();
        }

        let signal = downsample(samples, DOWNSAMPLE_FACTOR);
        let rate = frame_rate as f64 / DOWNSAMPLE_FACTOR as f64;
        let bins = band_map(rate);

        let frame_count = if signal.len() <= FRAME_SIZE {
            1
        } else {
            (signal.len() - FRAME_SIZE) / HOP_SIZE + 1
        };
        trace!(
            "{} samples at {rate} Hz after decimation, {frame_count} frame(s)",
            signal.len()
        );

        let mut buffer = vec![Complex::new(0.0, 0.0); FRAME_SIZE];
        let mut frames = Vec::with_capacity(frame_count);

        for frame in 0..frame_count {
            let start = frame * HOP_SIZE;
            for (n, slot) in buffer.iter_mut().enumerate() {
                let sample = signal.get(start + n).copied().unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[n], 0.0);
            }

            self.fft.process(&mut buffer);

            let mut chroma = [0.0f64; BANDS];
            for &(bin, band) in &bins {
                chroma[band] = chroma[band].max(buffer[bin].norm());
            }
            frames.push(chroma);
        }

        frames
    }

    /// The average of [`Chromagram::frames`]. All zeros for an empty signal.
    pub fn collapsed(&self, samples: &[f32], frame_rate: u32) -> [f64; BANDS] {
        let frames = self.frames(samples, frame_rate);
        let mut collapsed = [0.0f64; BANDS];
        if frames.is_empty() {
            return collapsed;
        }

        for frame in &frames {
            for (total, value) in collapsed.iter_mut().zip(frame) {
                *total += value;
            }
        }
        let count = frames.len() as f64;
        collapsed.iter_mut().for_each(|v| *v /= count);
        collapsed
    }
}

/// Averages interleaved channels into one.
pub fn mix_down(samples: &[f32], channels: usize) -> Cow<'_, [f32]> {
    if channels <= 1 {
        return Cow::Borrowed(samples);
    }
    Cow::Owned(
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect(),
    )
}

/// Windowed-sinc low-pass followed by keeping every `factor`-th sample.
pub fn downsample(samples: &[f32], factor: usize) -> Vec<f64> {
    if factor <= 1 {
        return samples.iter().map(|&s| f64::from(s)).collect();
    }

    let taps = low_pass(factor);
    let half = taps.len() / 2;

    (0..samples.len())
        .step_by(factor)
        .map(|centre| {
            taps.iter()
                .enumerate()
                .filter_map(|(k, h)| {
                    let index = (centre + k).checked_sub(half)?;
                    samples.get(index).map(|&s| h * f64::from(s))
                })
                .sum()
        })
        .collect()
}

fn low_pass(factor: usize) -> Vec<f64> {
    let cutoff = 0.45 / factor as f64;
    let m = (LOW_PASS_TAPS - 1) as f64;

    let mut taps: Vec<f64> = (0..LOW_PASS_TAPS)
        .map(|n| {
            let x = n as f64 - m / 2.0;
            let sinc = if x == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * PI * cutoff * x).sin() / (PI * x)
            };
            sinc * (0.54 - 0.46 * (2.0 * PI * n as f64 / m).cos())
        })
        .collect();

    let gain: f64 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= gain);
    taps
}

fn blackman(size: usize) -> Vec<f64> {
    let m = (size - 1) as f64;
    (0..size)
        .map(|n| {
            let phase = 2.0 * PI * n as f64 / m;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        })
        .collect()
}

/// `(bin, band)` pairs for every FFT bin that falls inside the band range.
fn band_map(rate: f64) -> Vec<(usize, usize)> {
    (1..FRAME_SIZE / 2)
        .filter_map(|bin| {
            let frequency = bin as f64 * rate / FRAME_SIZE as f64;
            let band = (12.0 * (frequency / STARTING_FREQUENCY).log2()).round();
            (band >= 0.0 && band < BANDS as f64).then_some((bin, band as usize))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f64, rate: u32, seconds: f64) -> Vec<f32> {
        let count = (rate as f64 * seconds) as usize;
        (0..count)
            .map(|n| (8000.0 * (2.0 * PI * frequency * n as f64 / rate as f64).sin()) as f32)
            .collect()
    }

    #[test]
    fn pure_tone_lands_in_its_band() {
        // A4 is 48 semitones above A0.
        let chroma = Chromagram::new().collapsed(&sine(440.0, 44100, 2.0), 44100);
        let loudest = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(band, _)| band);
        assert_eq!(loudest, Some(48));
    }

    #[test]
    fn band_magnitudes_are_non_negative_per_frame() {
        let frames = Chromagram::new().frames(&sine(220.0, 44100, 1.0), 44100);
        assert!(!frames.is_empty());
        for frame in &frames {
            assert!(frame.iter().all(|&m| m >= 0.0));
            assert!(frame.iter().any(|&m| m > 0.0));
        }
    }

    #[test]
    fn frame_count_follows_hop() {
        let chroma = Chromagram::new();
        assert!(chroma.frames(&[], 44100).is_empty());
        assert_eq!(chroma.frames(&[0.0; 1000], 44100).len(), 1);

        let samples = vec![0.0; DOWNSAMPLE_FACTOR * (FRAME_SIZE + 2 * HOP_SIZE)];
        assert_eq!(chroma.frames(&samples, 44100).len(), 3);
    }

    #[test]
    fn downsample_keeps_dc_and_length() {
        let out = downsample(&[1.0; 400], 4);
        assert_eq!(out.len(), 100);
        assert!((out[50] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mix_down_averages_frames() {
        assert_eq!(&*mix_down(&[1.0, 3.0, -2.0, 2.0], 2), &[2.0, 0.0]);
        assert_eq!(&*mix_down(&[1.0, 2.0], 1), &[1.0, 2.0]);
    }
}
