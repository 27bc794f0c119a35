use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticType {
    /// Impact: deep bass
    Heavy,
    /// Impact: bass, or rigid but not extreme timbre
    Medium,
    /// Impact: high-pitched content
    Light,
    /// Impact: quiet content
    Soft,
    /// Impact: very wide, metallic spectrum
    Rigid,
    /// Notification: loudness jump with a bright spectrum
    Success,
    /// Notification: loudness jump with a neutral spectrum
    Warning,
    /// Notification: loudness jump with a dark spectrum
    Error,
}

impl HapticType {
    pub fn is_notification(self) -> bool {
        matches!(self, HapticType::Success | HapticType::Warning | HapticType::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HapticType::Heavy => "heavy",
            HapticType::Medium => "medium",
            HapticType::Light => "light",
            HapticType::Soft => "soft",
            HapticType::Rigid => "rigid",
            HapticType::Success => "success",
            HapticType::Warning => "warning",
            HapticType::Error => "error",
        }
    }
}

impl fmt::Display for HapticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single haptic pulse. Values are kept at full precision in memory and
/// rounded to three decimals only when serialized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HapticEvent {
    #[serde(serialize_with = "crate::output::round3")]
    pub time: f64,
    #[serde(serialize_with = "crate::output::round3_f32")]
    pub intensity: f32,
    #[serde(serialize_with = "crate::output::round3_f32")]
    pub sharpness: f32,
    #[serde(rename = "type")]
    pub kind: HapticType,
}

impl HapticEvent {
    pub fn new(time: f64, intensity: f32, sharpness: f32, kind: HapticType) -> Self {
        Self {
            time,
            intensity: intensity.clamp(0.0, 1.0),
            sharpness: sharpness.clamp(0.0, 1.0),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_ranges() {
        let e = HapticEvent::new(0.5, 1.7, -0.2, HapticType::Light);
        assert_eq!(e.intensity, 1.0);
        assert_eq!(e.sharpness, 0.0);
    }

    #[test]
    fn notification_kinds() {
        assert!(HapticType::Success.is_notification());
        assert!(HapticType::Warning.is_notification());
        assert!(HapticType::Error.is_notification());
        assert!(!HapticType::Heavy.is_notification());
        assert!(!HapticType::Soft.is_notification());
    }

    #[test]
    fn serializes_rounded_with_type_key() {
        let e = HapticEvent::new(1.0 / 60.0, 0.623456, 0.99949, HapticType::Heavy);
        let json = serde_json::to_value(e).unwrap();
        assert_eq!(json["type"], "heavy");
        assert_eq!(json["time"], 0.017);
        assert_eq!(json["intensity"], 0.623);
        assert_eq!(json["sharpness"], 0.999);
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn display_matches_serde_name() {
        for kind in [HapticType::Rigid, HapticType::Warning] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }
}
