use std::io;
use std::path::PathBuf;

use gdrive_core::DriveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("failed to read local file {path:?}: {source}")]
    LocalRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write local file {path:?}: {source}")]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("transport error: {0}")]
    Transport(#[from] DriveError),
    #[error("entry {name:?} has no identifier and cannot be opened")]
    DeadEnd { name: Option<String> },
    #[error("entry {id} is not a folder")]
    NotAFolder { id: String },
    #[error("request was superseded or cancelled")]
    Cancelled,
    #[error("drive session has been closed")]
    SessionClosed,
    #[error("browser has been exited")]
    Exited,
    #[error("listing task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("unknown file type category: {0}")]
    UnknownCategory(String),
}
