use super::features::FeatureVector;

/// Default smoothing factor; 0 leaves the feature curves untouched.
pub const DEFAULT_SMOOTHING: f32 = 0.0;

/// Largest accepted smoothing factor. At 1.0 the curves would never move.
pub const MAX_SMOOTHING: f32 = 0.99;

/// Bidirectional EMA over each feature curve.
///
/// `smoothing` is the weight of the running average (`alpha = 1 - smoothing`).
/// A forward and a backward pass are averaged so peaks stay where they are in
/// time instead of lagging behind the audio.
pub fn smooth_features(features: &[FeatureVector], smoothing: f32) -> Vec<FeatureVector> {
    if features.len() < 2 || smoothing.is_nan() || smoothing <= 0.0 {
        return features.to_vec();
    }
    let alpha = 1.0 - smoothing.min(MAX_SMOOTHING);

    let rms = smooth_curve(features.iter().map(|f| f.rms), alpha);
    let centroid = smooth_curve(features.iter().map(|f| f.spectral_centroid), alpha);
    let rolloff = smooth_curve(features.iter().map(|f| f.spectral_rolloff), alpha);
    let bandwidth = smooth_curve(features.iter().map(|f| f.spectral_bandwidth), alpha);

    (0..features.len())
        .map(|i| FeatureVector {
            rms: rms[i],
            spectral_centroid: centroid[i],
            spectral_rolloff: rolloff[i],
            spectral_bandwidth: bandwidth[i],
        })
        .collect()
}

fn smooth_curve(values: impl Iterator<Item = f32>, alpha: f32) -> Vec<f32> {
    let raw: Vec<f32> = values.collect();
    let n = raw.len();

    let mut forward = vec![0.0f32; n];
    forward[0] = raw[0];
    for i in 1..n {
        forward[i] = alpha * raw[i] + (1.0 - alpha) * forward[i - 1];
    }

    let mut backward = vec![0.0f32; n];
    backward[n - 1] = raw[n - 1];
    for i in (0..n - 1).rev() {
        backward[i] = alpha * raw[i] + (1.0 - alpha) * backward[i + 1];
    }

    forward
        .iter()
        .zip(backward.iter())
        .map(|(f, b)| (f + b) * 0.5)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(rms: f32, centroid: f32) -> FeatureVector {
        FeatureVector {
            rms,
            spectral_centroid: centroid,
            spectral_rolloff: rms,
            spectral_bandwidth: rms,
        }
    }

    #[test]
    fn zero_smoothing_is_identity() {
        let features = vec![fv(0.1, 100.0), fv(0.9, 5000.0), fv(0.2, 300.0)];
        assert_eq!(smooth_features(&features, 0.0), features);
        assert_eq!(smooth_features(&features, f32::NAN), features);
    }

    #[test]
    fn single_frame_spike_is_flattened() {
        let mut features = vec![FeatureVector::default(); 21];
        features[10] = fv(1.0, 4000.0);

        let smoothed = smooth_features(&features, 0.85);
        assert_eq!(smoothed.len(), features.len());
        // Forward and backward passes each keep alpha = 0.15 of the spike.
        assert!((smoothed[10].rms - 0.15).abs() < 1e-6, "rms {}", smoothed[10].rms);
        assert!(smoothed[10].spectral_centroid < 700.0);
        // The peak stays on the spike's frame.
        assert!(smoothed.iter().all(|f| f.rms <= smoothed[10].rms));
        assert!((smoothed[9].rms - smoothed[11].rms).abs() < 1e-6);
    }

    #[test]
    fn steady_curve_is_unchanged() {
        let features = vec![fv(0.6, 50.0); 30];
        for f in smooth_features(&features, 0.85) {
            assert!((f.rms - 0.6).abs() < 1e-5);
            assert!((f.spectral_centroid - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn short_inputs_pass_through() {
        assert!(smooth_features(&[], 0.5).is_empty());
        assert_eq!(smooth_features(&[fv(0.3, 10.0)], 0.5), vec![fv(0.3, 10.0)]);
    }
}
