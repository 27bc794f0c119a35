use serde::Deserialize;

use super::event::{HapticEvent, HapticType};
use crate::audio::features::FeatureVector;

/// How a transition notification combines with an impact matched on the same frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Timbral impacts win; a transition replaces only `soft` or nothing.
    #[default]
    Fallback,
    /// A transition replaces whatever impact matched.
    Override,
}

/// Every tunable constant used by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub deep_bass_centroid_hz: f32,
    pub deep_bass_rms: f32,
    pub bass_centroid_hz: f32,
    pub bass_rms: f32,

    pub very_high_pitch_centroid_hz: f32,
    pub very_high_pitch_rolloff: f32,
    pub very_high_pitch_gain: f32,
    pub very_high_pitch_sharpness: f32,
    pub high_pitch_centroid_hz: f32,
    pub high_pitch_rolloff: f32,
    pub high_pitch_sharpness: f32,

    pub very_rigid_bandwidth: f32,
    pub rigid_bandwidth: f32,
    pub rigid_rolloff_min: f32,
    pub rigid_rolloff_max: f32,

    pub soft_rms: f32,
    /// Frames at or below this RMS never produce an impact.
    pub silence_rms: f32,

    pub transition_threshold: f32,
    pub strong_transition_threshold: f32,
    pub success_rolloff: f32,
    pub error_rolloff: f32,
    pub strong_success_rolloff: f32,
    pub strong_error_rolloff: f32,
    pub transition_policy: TransitionPolicy,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            deep_bass_centroid_hz: 100.0,
            deep_bass_rms: 0.5,
            bass_centroid_hz: 200.0,
            bass_rms: 0.3,

            very_high_pitch_centroid_hz: 3000.0,
            very_high_pitch_rolloff: 0.7,
            very_high_pitch_gain: 1.5,
            very_high_pitch_sharpness: 0.9,
            high_pitch_centroid_hz: 2000.0,
            high_pitch_rolloff: 0.6,
            high_pitch_sharpness: 0.6,

            very_rigid_bandwidth: 0.84,
            rigid_bandwidth: 0.7,
            rigid_rolloff_min: 0.4,
            rigid_rolloff_max: 0.6,

            soft_rms: 0.1,
            silence_rms: 1e-3,

            transition_threshold: 0.4,
            strong_transition_threshold: 0.6,
            success_rolloff: 0.6,
            error_rolloff: 0.4,
            strong_success_rolloff: 0.7,
            strong_error_rolloff: 0.3,
            transition_policy: TransitionPolicy::Fallback,
        }
    }
}

/// Values derived from a frame that rule outcomes are shaped from.
struct FrameView<'a> {
    features: &'a FeatureVector,
    /// clamp(rms, 0, 1)
    intensity: f32,
    /// centroid / Nyquist
    brightness: f32,
}

/// One entry of the priority cascade.
pub struct Rule {
    pub name: &'static str,
    pub kind: HapticType,
    /// A transition detected on the same frame replaces this rule under
    /// [`TransitionPolicy::Fallback`].
    pub yields_to_transition: bool,
    matches: fn(&FeatureVector, &ClassifierThresholds) -> bool,
    /// Returns (intensity, sharpness).
    shape: fn(&FrameView, &ClassifierThresholds) -> (f32, f32),
}

fn rigid_band(f: &FeatureVector, t: &ClassifierThresholds) -> bool {
    f.spectral_rolloff > t.rigid_rolloff_min && f.spectral_rolloff < t.rigid_rolloff_max
}

/// Impact rules, most extreme first. The first match wins.
pub const RULES: &[Rule] = &[
    Rule {
        name: "deep_bass",
        kind: HapticType::Heavy,
        yields_to_transition: false,
        matches: |f, t| f.spectral_centroid < t.deep_bass_centroid_hz && f.rms > t.deep_bass_rms,
        shape: |v, _| (v.intensity, 1.0 - v.brightness),
    },
    Rule {
        name: "bass",
        kind: HapticType::Medium,
        yields_to_transition: false,
        matches: |f, t| f.spectral_centroid < t.bass_centroid_hz && f.rms > t.bass_rms,
        shape: |v, _| (v.intensity, v.brightness),
    },
    Rule {
        name: "very_high_pitch",
        kind: HapticType::Light,
        yields_to_transition: false,
        matches: |f, t| {
            f.spectral_centroid > t.very_high_pitch_centroid_hz
                && f.spectral_rolloff > t.very_high_pitch_rolloff
        },
        shape: |v, t| {
            (
                v.intensity * t.very_high_pitch_gain,
                v.brightness.max(t.very_high_pitch_sharpness),
            )
        },
    },
    Rule {
        name: "high_pitch",
        kind: HapticType::Light,
        yields_to_transition: false,
        matches: |f, t| {
            f.spectral_centroid > t.high_pitch_centroid_hz && f.spectral_rolloff > t.high_pitch_rolloff
        },
        shape: |v, t| (v.intensity, v.brightness.max(t.high_pitch_sharpness)),
    },
    Rule {
        name: "very_rigid",
        kind: HapticType::Rigid,
        yields_to_transition: false,
        matches: |f, t| f.spectral_bandwidth > t.very_rigid_bandwidth && rigid_band(f, t),
        shape: |v, _| (v.intensity, v.features.spectral_bandwidth),
    },
    Rule {
        name: "rigid",
        kind: HapticType::Medium,
        yields_to_transition: false,
        matches: |f, t| f.spectral_bandwidth > t.rigid_bandwidth && rigid_band(f, t),
        shape: |v, _| (v.intensity, v.features.spectral_bandwidth),
    },
    Rule {
        name: "soft",
        kind: HapticType::Soft,
        yields_to_transition: true,
        matches: |f, t| f.rms < t.soft_rms,
        shape: |v, _| (v.intensity, v.brightness),
    },
];

/// Intensity a frame carries forward as the next frame's `prev_intensity`.
pub fn frame_intensity(features: &FeatureVector) -> f32 {
    features.rms.clamp(0.0, 1.0)
}

pub struct Classifier {
    thresholds: ClassifierThresholds,
    nyquist: f32,
}

impl Classifier {
    pub fn new(thresholds: ClassifierThresholds, sample_rate: u32) -> Self {
        Self {
            thresholds,
            nyquist: (sample_rate as f32 / 2.0).max(1.0),
        }
    }

    /// First impact rule matching `features`, if any.
    pub fn matching_rule(&self, features: &FeatureVector) -> Option<&'static Rule> {
        if features.rms <= self.thresholds.silence_rms {
            return None;
        }
        RULES.iter().find(|rule| (rule.matches)(features, &self.thresholds))
    }

    /// Notification kind for a loudness jump of `delta` on a frame with `rolloff`.
    pub fn transition_kind(&self, delta: f32, rolloff: f32) -> Option<HapticType> {
        let t = &self.thresholds;
        let magnitude = delta.abs();
        if magnitude <= t.transition_threshold {
            return None;
        }

        let (success_above, error_below) = if magnitude > t.strong_transition_threshold {
            (t.strong_success_rolloff, t.strong_error_rolloff)
        } else {
            (t.success_rolloff, t.error_rolloff)
        };

        Some(if rolloff > success_above {
            HapticType::Success
        } else if rolloff < error_below {
            HapticType::Error
        } else {
            HapticType::Warning
        })
    }

    /// Classify one frame. Pure: the same inputs always give the same output.
    /// Non-finite inputs yield no event.
    pub fn classify(
        &self,
        features: &FeatureVector,
        prev_intensity: f32,
        time: f64,
    ) -> Option<HapticEvent> {
        if !features.is_finite() || !prev_intensity.is_finite() {
            return None;
        }

        let view = FrameView {
            features,
            intensity: frame_intensity(features),
            brightness: (features.spectral_centroid / self.nyquist).clamp(0.0, 1.0),
        };

        let impact = self.matching_rule(features).map(|rule| {
            log::trace!("t={:.3}s: rule {} matched", time, rule.name);
            let (intensity, sharpness) = (rule.shape)(&view, &self.thresholds);
            (rule, HapticEvent::new(time, intensity, sharpness, rule.kind))
        });

        let transition = self
            .transition_kind(view.intensity - prev_intensity, features.spectral_rolloff)
            .map(|kind| {
                HapticEvent::new(
                    time,
                    view.intensity.max(prev_intensity),
                    features.spectral_rolloff,
                    kind,
                )
            });

        match (self.thresholds.transition_policy, impact) {
            (TransitionPolicy::Fallback, Some((rule, event))) if !rule.yields_to_transition => {
                Some(event)
            }
            (_, impact) => transition.or(impact.map(|(_, event)| event)),
        }
    }

    /// Classify every frame in order, carrying `prev_intensity` forward from 0.
    pub fn classify_all(&self, features: &[FeatureVector], fps: u32) -> Vec<HapticEvent> {
        let fps = fps.max(1) as f64;
        let (events, _) = features.iter().enumerate().fold(
            (Vec::new(), 0.0f32),
            |(mut events, prev), (i, f)| {
                if let Some(event) = self.classify(f, prev, i as f64 / fps) {
                    events.push(event);
                }
                let next = if f.is_finite() { frame_intensity(f) } else { prev };
                (events, next)
            },
        );
        events
    }
}
