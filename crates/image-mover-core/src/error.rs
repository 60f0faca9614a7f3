use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single image reference could not be relocated.
#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("unsupported image path: {0}")]
    UnsupportedReference(String),

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move image from {} to {}: destination already exists", from.display(), to.display())]
    DestinationExists { from: PathBuf, to: PathBuf },

    #[error("failed to move image from {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that abort handling of a whole rename notification.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to read {path}: {cause:#}")]
    Read { path: String, cause: anyhow::Error },
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
