use indicatif::ProgressBar;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::features::{spectral_bandwidth, spectral_centroid, spectral_rolloff, FeatureVector};
use super::frame::Frame;
use super::normalize::rms;

pub const FFT_SIZE: usize = 2048;

/// Computes [`FeatureVector`]s from frames of a single waveform.
///
/// Spectral features come from a Hann-windowed [`FFT_SIZE`] context centred on
/// the frame. The context is shifted to stay inside the waveform when the
/// waveform is long enough, and zero-padded otherwise. The FFT plan is shared
/// read-only, so frames can be processed on any thread in any order.
pub struct FeatureExtractor {
    sample_rate: u32,
    fft: Arc<dyn Fft<f32>>,
    hann: Vec<f32>,
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        Self {
            sample_rate,
            fft,
            hann: hann_window(FFT_SIZE),
        }
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    fn freq_resolution(&self) -> f32 {
        self.sample_rate as f32 / FFT_SIZE as f32
    }

    /// Features of one frame. Never fails: an all-zero frame or a frame whose
    /// spectrum produces a non-finite value yields the zero vector.
    pub fn extract(&self, waveform: &[f32], frame: &Frame) -> FeatureVector {
        let frame_rms = rms(&frame.samples(waveform));
        if frame_rms == 0.0 {
            return FeatureVector::default();
        }

        let spectrum = self.magnitude_spectrum(waveform, frame.center());
        let res = self.freq_resolution();
        let nyquist = self.nyquist();

        let centroid = spectral_centroid(&spectrum, res);
        let features = FeatureVector {
            rms: frame_rms,
            spectral_centroid: centroid,
            spectral_rolloff: (spectral_rolloff(&spectrum, res) / nyquist).min(1.0),
            spectral_bandwidth: (spectral_bandwidth(&spectrum, res, centroid) / (nyquist / 2.0))
                .min(1.0),
        };

        if features.is_finite() {
            features
        } else {
            log::debug!("Frame {}: non-finite features {:?}, using silence", frame.index, features);
            FeatureVector::default()
        }
    }

    /// Features for every frame, computed in parallel and returned in frame order.
    pub fn extract_all(
        &self,
        waveform: &[f32],
        frames: &[Frame],
        progress: &ProgressBar,
    ) -> Vec<FeatureVector> {
        frames
            .par_iter()
            .map(|frame| {
                let features = self.extract(waveform, frame);
                progress.inc(1);
                features
            })
            .collect()
    }

    fn magnitude_spectrum(&self, waveform: &[f32], center: usize) -> Vec<f32> {
        let mut start = center.saturating_sub(FFT_SIZE / 2);
        if waveform.len() >= FFT_SIZE {
            start = start.min(waveform.len() - FFT_SIZE);
        }
        let end = (start + FFT_SIZE).min(waveform.len());

        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); FFT_SIZE];
        for (i, &s) in waveform[start.min(end)..end].iter().enumerate() {
            buffer[i] = Complex::new(s * self.hann[i], 0.0);
        }

        self.fft.process(&mut buffer);

        buffer[..=FFT_SIZE / 2].iter().map(|c| c.norm()).collect()
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::frame::{Framer, LastFramePolicy};

    const SR: u32 = 22050;

    fn sine(freq: f32, amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    fn features_for(waveform: &[f32]) -> Vec<FeatureVector> {
        let frames = Framer::new(SR, 60, LastFramePolicy::Pad).frames(waveform);
        FeatureExtractor::new(SR).extract_all(waveform, &frames, &ProgressBar::hidden())
    }

    #[test]
    fn low_sine_has_low_centroid() {
        let wave = sine(50.0, 0.85, SR as usize);
        let features = features_for(&wave);
        assert_eq!(features.len(), 60);
        for f in &features {
            assert!(f.spectral_centroid < 100.0, "centroid {}", f.spectral_centroid);
            assert!(f.rms > 0.5 && f.rms < 0.7, "rms {}", f.rms);
            assert!(f.spectral_rolloff < 0.05);
        }
    }

    #[test]
    fn high_sine_has_high_centroid_and_rolloff() {
        let wave = sine(5000.0, 0.5, SR as usize / 2);
        let features = features_for(&wave);
        let mid = &features[features.len() / 2];
        assert!((mid.spectral_centroid - 5000.0).abs() < 150.0, "centroid {}", mid.spectral_centroid);
        let expected = 5000.0 / (SR as f32 / 2.0);
        assert!((mid.spectral_rolloff - expected).abs() < 0.02);
        assert!(mid.spectral_bandwidth < 0.05);
    }

    #[test]
    fn silent_frames_are_zero_vectors() {
        // Frames 4 and 5 start at samples 1470 and 1837.
        let mut wave = sine(440.0, 0.5, 1470);
        wave.extend(vec![0.0; 735]);
        let features = features_for(&wave);
        assert_eq!(features.len(), 6);
        assert!(features[0].rms > 0.0);
        assert_eq!(features[4], FeatureVector::default());
        assert_eq!(features[5], FeatureVector::default());
    }

    #[test]
    fn short_waveform_is_zero_padded() {
        let wave = sine(1000.0, 0.5, 500);
        let features = features_for(&wave);
        assert_eq!(features.len(), 2);
        assert!(features.iter().all(|f| f.is_finite()));
        assert!(features[0].spectral_centroid > 500.0);
    }

    #[test]
    fn parallel_matches_sequential() {
        let wave: Vec<f32> = (0..SR as usize)
            .map(|i| ((i * 7919) % 1000) as f32 / 1000.0 - 0.5)
            .collect();
        let frames = Framer::new(SR, 60, LastFramePolicy::Pad).frames(&wave);
        let extractor = FeatureExtractor::new(SR);
        let parallel = extractor.extract_all(&wave, &frames, &ProgressBar::hidden());
        let sequential: Vec<_> = frames.iter().map(|f| extractor.extract(&wave, f)).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn features_stay_in_range() {
        let wave: Vec<f32> = (0..SR as usize)
            .map(|i| if (i / 3) % 2 == 0 { 0.9 } else { -0.9 })
            .collect();
        for f in features_for(&wave) {
            assert!((0.0..=1.0).contains(&f.spectral_rolloff));
            assert!((0.0..=1.0).contains(&f.spectral_bandwidth));
            assert!(f.spectral_centroid >= 0.0);
        }
    }

    #[test]
    fn hann_endpoints_are_zero() {
        let w = hann_window(8);
        assert!(w[0].abs() < 1e-6);
        assert!(w[7].abs() < 1e-6);
    }
}
