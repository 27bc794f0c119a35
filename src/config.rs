use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::frame::LastFramePolicy;
use crate::audio::normalize::DEFAULT_TARGET_RMS;
use crate::audio::smooth::DEFAULT_SMOOTHING;
use crate::error::{HaptickError, Result};
use crate::haptics::classifier::ClassifierThresholds;
use crate::haptics::compact::DEFAULT_DEADBAND;
use crate::pipeline::DEFAULT_FPS;

const CONFIG_FILE_NAME: &str = "haptick.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub classifier: ClassifierThresholds,
    #[serde(default)]
    pub compactor: CompactorConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_target_rms")]
    pub target_rms: f32,
    #[serde(default)]
    pub last_frame: LastFramePolicy,
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompactorConfig {
    #[serde(default = "default_deadband")]
    pub deadband: f32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            target_rms: default_target_rms(),
            last_frame: LastFramePolicy::default(),
            smoothing: default_smoothing(),
        }
    }
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            deadband: default_deadband(),
            enabled: default_enabled(),
        }
    }
}

fn default_fps() -> u32 { DEFAULT_FPS }
fn default_target_rms() -> f32 { DEFAULT_TARGET_RMS }
fn default_smoothing() -> f32 { DEFAULT_SMOOTHING }
fn default_deadband() -> f32 { DEFAULT_DEADBAND }
fn default_enabled() -> bool { true }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| HaptickError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| HaptickError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Explicit path first, then `./haptick.toml`, then the user config directories.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("haptick").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("haptick").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
