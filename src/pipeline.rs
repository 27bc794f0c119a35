use indicatif::ProgressBar;
use serde::Serialize;

use crate::audio::analysis::FeatureExtractor;
use crate::audio::decode::AudioData;
use crate::audio::frame::{Framer, LastFramePolicy};
use crate::audio::normalize::{normalize, DEFAULT_TARGET_RMS};
use crate::audio::smooth::{smooth_features, DEFAULT_SMOOTHING};
use crate::error::{HaptickError, Result};
use crate::haptics::classifier::{Classifier, ClassifierThresholds};
use crate::haptics::compact::Compactor;
use crate::haptics::event::HapticEvent;
use crate::media::FileType;

/// Version of the JSON document layout.
pub const FORMAT_VERSION: u32 = 3;

pub const DEFAULT_FPS: u32 = 60;

/// Container and decoded durations further apart than this are logged.
const DURATION_MISMATCH_WARN: f64 = 0.1;

/// Describes the source a waveform was decoded from.
#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    pub input_file: String,
    pub file_type: FileType,
}

#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    pub fps: u32,
    pub target_rms: f32,
    pub last_frame: LastFramePolicy,
    /// Feature curve smoothing in `[0, 1)`; 0 disables it.
    pub smoothing: f32,
    pub thresholds: ClassifierThresholds,
    pub compactor: Compactor,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            target_rms: DEFAULT_TARGET_RMS,
            last_frame: LastFramePolicy::Pad,
            smoothing: DEFAULT_SMOOTHING,
            thresholds: ClassifierThresholds::default(),
            compactor: Compactor::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(HaptickError::InvalidOption("fps must be greater than 0".into()));
        }
        if !self.target_rms.is_finite() || self.target_rms <= 0.0 {
            return Err(HaptickError::InvalidOption(format!(
                "target RMS must be a positive number, got {}",
                self.target_rms
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(HaptickError::InvalidOption(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Metadata {
    pub version: u32,
    pub fps: u32,
    #[serde(serialize_with = "crate::output::round2")]
    pub duration: f64,
    pub total_frames: usize,
    pub input_file: String,
    pub file_type: FileType,
    #[serde(serialize_with = "crate::output::round2_opt")]
    pub media_duration: Option<f64>,
    #[serde(serialize_with = "crate::output::round2")]
    pub audio_duration: f64,
    #[serde(serialize_with = "crate::output::round4_f32")]
    pub normalization_factor: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResult {
    pub metadata: Metadata,
    /// Sorted by non-decreasing time.
    pub haptic_events: Vec<HapticEvent>,
}

/// Run the whole pipeline over a decoded waveform.
///
/// `progress` is advanced once per analysed frame; pass
/// [`ProgressBar::hidden`] when no progress display is wanted.
pub fn analyze(
    audio: &AudioData,
    request: &AnalysisRequest,
    options: &AnalysisOptions,
    progress: &ProgressBar,
) -> Result<AnalysisResult> {
    options.validate()?;

    let audio_duration = audio.audio_duration();
    if let Some(media) = audio.media_duration {
        if (media - audio_duration).abs() > DURATION_MISMATCH_WARN {
            log::warn!(
                "Container reports {:.2}s but decoded audio is {:.2}s",
                media, audio_duration
            );
        }
    }

    log::info!("Pass 1: Normalizing (target rms={:.3})...", options.target_rms);
    let normalized = normalize(&audio.samples, options.target_rms);

    let framer = Framer::new(audio.sample_rate, options.fps, options.last_frame);
    let frames = framer.frames(&normalized.samples);
    log::info!(
        "Pass 2: Feature extraction ({} frames of {} samples)...",
        frames.len(),
        framer.frame_length()
    );
    progress.set_length(frames.len() as u64);
    let extractor = FeatureExtractor::new(audio.sample_rate);
    let features = extractor.extract_all(&normalized.samples, &frames, progress);

    let features = if options.smoothing > 0.0 {
        log::info!("Pass 3: Smoothing (smoothing={:.2})...", options.smoothing);
        smooth_features(&features, options.smoothing)
    } else {
        features
    };

    log::info!("Pass 4: Classification...");
    let classifier = Classifier::new(options.thresholds, audio.sample_rate);
    let candidates = classifier.classify_all(&features, options.fps);

    let haptic_events = options.compactor.compact(&candidates);
    log::info!(
        "Pass 5: Compaction (deadband={:.2}): {} -> {} events",
        options.compactor.deadband(),
        candidates.len(),
        haptic_events.len()
    );

    Ok(AnalysisResult {
        metadata: Metadata {
            version: FORMAT_VERSION,
            fps: options.fps,
            duration: audio.media_duration.unwrap_or(audio_duration),
            total_frames: features.len(),
            input_file: request.input_file.clone(),
            file_type: request.file_type,
            media_duration: audio.media_duration,
            audio_duration,
            normalization_factor: normalized.factor,
        },
        haptic_events,
    })
}
