use clap::Parser;
use std::path::PathBuf;

use crate::haptics::classifier::TransitionPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "haptick",
    version,
    about = "Convert audio or video files into haptic feedback event streams",
    after_help = "Supported formats:\n  Audio: .mp3, .wav, .flac, .aac, .ogg, .m4a, .wma\n  Video: .mp4, .avi, .mov, .mkv, .wmv, .flv, .webm, .m4v"
)]
pub struct Cli {
    /// Input audio or video file
    pub input: PathBuf,

    /// Output JSON file (defaults to <input>.haptic.json)
    pub output: Option<PathBuf>,

    /// Haptic frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// RMS level the waveform is normalized to before analysis
    #[arg(long, default_value_t = 0.1)]
    pub target_rms: f32,

    /// Minimum intensity change for a repeated event of the same type to be kept
    #[arg(long, default_value_t = 0.15)]
    pub deadband: f32,

    /// Feature smoothing before classification, 0 (off) to 0.99
    #[arg(long, default_value_t = 0.0)]
    pub smoothing: f32,

    /// Drop a trailing partial frame instead of zero-padding it
    #[arg(long)]
    pub drop_partial_frame: bool,

    /// How loudness transitions combine with impact events
    #[arg(long, value_enum)]
    pub transition_policy: Option<TransitionPolicy>,

    /// Keep one event per matching frame
    #[arg(long)]
    pub no_compact: bool,

    /// Config file (default: ./haptick.toml or ~/.config/haptick/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["haptick", "song.mp3"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("song.mp3"));
        assert!(cli.output.is_none());
        assert_eq!(cli.fps, 60);
        assert_eq!(cli.target_rms, 0.1);
        assert_eq!(cli.deadband, 0.15);
        assert_eq!(cli.smoothing, 0.0);
        assert!(!cli.drop_partial_frame);
        assert!(cli.transition_policy.is_none());
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "haptick",
            "clip.mp4",
            "out.json",
            "--fps",
            "30",
            "--target-rms",
            "0.2",
            "--smoothing",
            "0.5",
            "--drop-partial-frame",
            "--transition-policy",
            "override",
            "--no-compact",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.fps, 30);
        assert_eq!(cli.target_rms, 0.2);
        assert_eq!(cli.smoothing, 0.5);
        assert!(cli.drop_partial_frame);
        assert_eq!(cli.transition_policy, Some(TransitionPolicy::Override));
        assert!(cli.no_compact);
        assert!(cli.quiet);
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["haptick"]).is_err());
    }
}
