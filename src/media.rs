use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::{HaptickError, Result};

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"];

/// Kind of source the waveform was pulled from, as recorded in the output metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Audio,
    Video,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Audio => write!(f, "audio"),
            FileType::Video => write!(f, "video"),
        }
    }
}

/// Classify a path by its extension alone. Case-insensitive.
pub fn file_type_of(path: &Path) -> Option<FileType> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileType::Audio)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(FileType::Video)
    } else {
        None
    }
}

/// Check that `path` exists and has a supported extension.
pub fn probe(path: &Path) -> Result<FileType> {
    if !path.exists() {
        return Err(HaptickError::InputNotFound(path.to_path_buf()));
    }

    file_type_of(path).ok_or_else(|| HaptickError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string(),
    })
}

pub fn supported_formats_help() -> String {
    format!(
        "Supported audio formats: {}\nSupported video formats: {}",
        dotted(AUDIO_EXTENSIONS),
        dotted(VIDEO_EXTENSIONS)
    )
}

fn dotted(exts: &[&str]) -> String {
    exts.iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(file_type_of(Path::new("song.mp3")), Some(FileType::Audio));
        assert_eq!(file_type_of(Path::new("clip.webm")), Some(FileType::Video));
        assert_eq!(file_type_of(Path::new("a/b/track.M4A")), Some(FileType::Audio));
        assert_eq!(file_type_of(Path::new("MOVIE.MKV")), Some(FileType::Video));
    }

    #[test]
    fn rejects_unknown_or_missing_extension() {
        assert_eq!(file_type_of(Path::new("notes.txt")), None);
        assert_eq!(file_type_of(Path::new("README")), None);
    }

    #[test]
    fn probe_reports_missing_file() {
        let path = PathBuf::from("/definitely/not/here/song.mp3");
        match probe(&path) {
            Err(HaptickError::InputNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected InputNotFound, got {:?}", other),
        }
    }

    #[test]
    fn probe_rejects_unsupported_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = probe(&path).unwrap_err();
        assert!(matches!(err, HaptickError::UnsupportedFormat { ref extension, .. } if extension == "txt"));
        assert!(err.to_string().contains(".webm"));
    }

    #[test]
    fn probe_accepts_existing_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(probe(&path).unwrap(), FileType::Video);
    }
}
