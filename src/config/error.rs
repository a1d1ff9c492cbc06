use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    /// Configuration file exists but cannot be opened for writing.
    #[error("Config file not writable: {0}")]
    NotWritable(PathBuf),
    /// Configuration file exists but cannot be read.
    #[error("Config file not readable: {0}")]
    NotReadable(PathBuf),
    /// Directory expected to hold themes is missing.
    #[error("Theme directory not found: {0}")]
    ThemeDirNotFound(PathBuf),
    /// Temporary file could not be created next to the target.
    #[error("Failed to create temporary file in {0}")]
    TempFileFailed(PathBuf),
    /// Writing the new content failed; the previous content is untouched
    /// unless the final copy itself failed part-way.
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
