/// Share of spectral energy that must lie below the rolloff frequency.
pub const ROLLOFF_PERCENT: f32 = 0.85;

/// Per-frame descriptors consumed by the haptic classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureVector {
    /// RMS energy of the frame's own samples (linear)
    pub rms: f32,
    /// Magnitude-weighted mean frequency (Hz)
    pub spectral_centroid: f32,
    /// 85% energy rolloff frequency divided by Nyquist (0.0-1.0)
    pub spectral_rolloff: f32,
    /// Spread around the centroid divided by Nyquist / 2 (0.0-1.0)
    pub spectral_bandwidth: f32,
}

impl FeatureVector {
    pub fn is_finite(&self) -> bool {
        self.rms.is_finite()
            && self.spectral_centroid.is_finite()
            && self.spectral_rolloff.is_finite()
            && self.spectral_bandwidth.is_finite()
    }
}

/// Magnitude-weighted mean frequency of `spectrum`, in Hz.
pub fn spectral_centroid(spectrum: &[f32], freq_resolution: f32) -> f32 {
    let total: f32 = spectrum.iter().sum();
    if total <= 1e-10 {
        return 0.0;
    }
    spectrum
        .iter()
        .enumerate()
        .map(|(i, &mag)| i as f32 * freq_resolution * mag)
        .sum::<f32>()
        / total
}

/// Frequency (Hz) below which [`ROLLOFF_PERCENT`] of the spectral energy lies.
pub fn spectral_rolloff(spectrum: &[f32], freq_resolution: f32) -> f32 {
    let total: f32 = spectrum.iter().map(|&m| m * m).sum();
    if total <= 1e-10 {
        return 0.0;
    }

    let threshold = ROLLOFF_PERCENT * total;
    let mut cumulative = 0.0;
    for (i, &mag) in spectrum.iter().enumerate() {
        cumulative += mag * mag;
        if cumulative >= threshold {
            return i as f32 * freq_resolution;
        }
    }
    (spectrum.len().saturating_sub(1)) as f32 * freq_resolution
}

/// Magnitude-weighted standard deviation of frequency around `centroid`, in Hz.
pub fn spectral_bandwidth(spectrum: &[f32], freq_resolution: f32, centroid: f32) -> f32 {
    let total: f32 = spectrum.iter().sum();
    if total <= 1e-10 {
        return 0.0;
    }
    let variance = spectrum
        .iter()
        .enumerate()
        .map(|(i, &mag)| {
            let d = i as f32 * freq_resolution - centroid;
            mag * d * d
        })
        .sum::<f32>()
        / total;
    variance.sqrt()
}
