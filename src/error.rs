use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, HaptickError>;

#[derive(Debug, thiserror::Error)]
pub enum HaptickError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error(
        "'{}' is not a supported audio or video file (extension: {extension})\n{}",
        .path.display(),
        crate::media::supported_formats_help()
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to decode media: {0}")]
    Decode(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize analysis result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl From<symphonia::core::errors::Error> for HaptickError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        HaptickError::Decode(err.to_string())
    }
}
