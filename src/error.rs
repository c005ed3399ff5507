use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("JPEG encoding error: {0}")]
    JpegEncoding(#[from] jpeg_encoder::EncodingError),

    #[error("WebP encoding error: {0}")]
    WebPEncoding(String),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid maximum width: {0}. Must be greater than zero")]
    InvalidMaxWidth(u32),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Path {path} is outside of {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Output name collision: {input} would overwrite outputs of {previous}")]
    OutputCollision { input: PathBuf, previous: PathBuf },

    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Statistics file error: {0}")]
    Stats(#[from] serde_json::Error),

    #[error("Image codec unavailable: {0}")]
    CodecUnavailable(String),
}

impl ProcessingError {
    /// The file or directory the error is about, when known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ProcessingError::Unreadable { path, .. }
            | ProcessingError::OutsideRoot { path, .. }
            | ProcessingError::OutputCollision { input: path, .. }
            | ProcessingError::DirectoryNotFound(path)
            | ProcessingError::DirectoryCreationFailed(path) => Some(path),
            ProcessingError::WalkdirError(e) => e.path(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessingError>;
