use serde::Serializer;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{HaptickError, Result};
use crate::pipeline::AnalysisResult;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub(crate) fn round2<S: Serializer>(value: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 2))
}

pub(crate) fn round2_opt<S: Serializer>(
    value: &Option<f64>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_some(&round_to(*v, 2)),
        None => s.serialize_none(),
    }
}

pub(crate) fn round3<S: Serializer>(value: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value, 3))
}

pub(crate) fn round3_f32<S: Serializer>(value: &f32, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value as f64, 3))
}

pub(crate) fn round4_f32<S: Serializer>(value: &f32, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(round_to(*value as f64, 4))
}

/// Default output path: `<dir>/<stem>.haptic.json` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{}.haptic.json", stem))
}

/// Render `result` as pretty JSON.
pub fn to_json_string(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write `result` to `path` as UTF-8 JSON.
///
/// The document goes to a sibling temporary file first and is renamed into
/// place, so a failed write never leaves a truncated file at `path`.
pub fn write_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    let json = to_json_string(result)?;

    let tmp = path.with_extension("json.tmp");
    let write_err = |source| HaptickError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::create(&tmp).map_err(write_err)?;
    if let Err(e) = file.write_all(json.as_bytes()).and_then(|_| file.sync_all()) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    drop(file);

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        write_err(e)
    })?;

    log::info!("JSON file generated: {}", path.display());
    Ok(())
}
