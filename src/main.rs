mod audio;
mod cli;
mod config;
mod error;
mod haptics;
mod media;
mod output;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

use cli::Cli;
use config::Config;
use haptics::compact::{Compactor, DEFAULT_DEADBAND};
use pipeline::{AnalysisOptions, AnalysisRequest, DEFAULT_FPS};
use audio::frame::LastFramePolicy;
use audio::normalize::DEFAULT_TARGET_RMS;
use audio::smooth::DEFAULT_SMOOTHING;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => {
            let cfg = config::load_config(&path);
            match cfg {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    cfg
                }
                // An explicitly requested config must load.
                Err(e) if cli.config.is_some() => return Err(e.into()),
                Err(e) => {
                    log::warn!("{}", e);
                    Config::default()
                }
            }
        }
        None => Config::default(),
    };

    let options = resolve_options(&cli, &config);
    options.validate()?;

    let input = &cli.input;
    let file_type = media::probe(input)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| output::default_output_path(input));

    log::info!("haptick - audio to haptics");
    log::info!("Processing {} file: {}", file_type, input.display());
    log::info!("Output: {}", output_path.display());
    log::info!("{} fps, target rms {:.3}", options.fps, options.target_rms);

    // 1. Decode
    log::info!("Decoding media...");
    let audio_data = audio::decode::decode_media(input)
        .with_context(|| format!("Failed to extract audio from {}", input.display()))?;

    // 2. Analyze
    let request = AnalysisRequest {
        input_file: input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_type,
    };

    let pb = if cli.quiet || !std::io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")?
                .progress_chars("=>-"),
        );
        pb
    };

    let result = pipeline::analyze(&audio_data, &request, &options, &pb)?;
    pb.finish_and_clear();

    log::info!(
        "Total frames: {}, Duration: {:.2}s",
        result.metadata.total_frames,
        result.metadata.duration
    );

    // 3. Write
    output::write_json(&result, &output_path)?;
    log::info!("Generated {} haptic events", result.haptic_events.len());

    Ok(())
}

/// Merge config file values with CLI flags. A CLI value wins whenever it
/// differs from its built-in default.
fn resolve_options(cli: &Cli, cfg: &Config) -> AnalysisOptions {
    let fps = if cli.fps != DEFAULT_FPS { cli.fps } else { cfg.analysis.fps };
    let target_rms = if cli.target_rms != DEFAULT_TARGET_RMS {
        cli.target_rms
    } else {
        cfg.analysis.target_rms
    };
    let smoothing = if cli.smoothing != DEFAULT_SMOOTHING {
        cli.smoothing
    } else {
        cfg.analysis.smoothing
    };
    let last_frame = if cli.drop_partial_frame {
        LastFramePolicy::Drop
    } else {
        cfg.analysis.last_frame
    };

    let mut thresholds = cfg.classifier;
    if let Some(policy) = cli.transition_policy {
        thresholds.transition_policy = policy;
    }

    let compactor = if cli.no_compact || !cfg.compactor.enabled {
        Compactor::disabled()
    } else if cli.deadband != DEFAULT_DEADBAND {
        Compactor::new(cli.deadband)
    } else {
        Compactor::new(cfg.compactor.deadband)
    };

    AnalysisOptions {
        fps,
        target_rms,
        last_frame,
        smoothing,
        thresholds,
        compactor,
    }
}
