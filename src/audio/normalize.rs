/// Below this RMS the input is treated as silence and left untouched.
pub const SILENCE_EPSILON: f32 = 1e-6;

pub const DEFAULT_TARGET_RMS: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct NormalizationResult {
    pub samples: Vec<f32>,
    /// Gain applied to every sample (`target_rms / measured_rms`, or 1.0 for silence).
    pub factor: f32,
}

/// Root-mean-square of `samples`, accumulated in f64. Empty input yields 0.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Rescale `samples` so their RMS equals `target_rms`.
pub fn normalize(samples: &[f32], target_rms: f32) -> NormalizationResult {
    let current = rms(samples);
    if current < SILENCE_EPSILON {
        log::debug!("Near-silent input (rms={:.2e}), skipping normalization", current);
        return NormalizationResult {
            samples: samples.to_vec(),
            factor: 1.0,
        };
    }

    let factor = target_rms / current;
    log::info!(
        "Normalize: rms={:.4} -> {:.4} (factor={:.4})",
        current, target_rms, factor
    );

    NormalizationResult {
        samples: samples.iter().map(|&s| s * factor).collect(),
        factor,
    }
}
