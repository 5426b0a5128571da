//! Error types for catalog construction and playback backends

use std::path::PathBuf;
use thiserror::Error;

/// A scan root could not be walked
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read media directory {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Tags of a single file could not be read; the item falls back to its filename
#[derive(Debug, Error)]
#[error("cannot read tags from {}: {reason}", path.display())]
pub struct MetadataError {
    pub path: PathBuf,
    pub reason: String,
}

/// Building a catalog failed
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("could not find any media to play")]
    Empty,
}

/// A player backend could not start or control playback
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("audio output unavailable: {0}")]
    AudioDevice(String),

    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupted file {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no video player available for {} (tried: {tried})", path.display())]
    NoPlayer { path: PathBuf, tried: String },
}

/// Result type for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;
