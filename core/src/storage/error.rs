//! Error types for race persistence

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or saving races
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create data directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read race file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write race file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("race file {path} is malformed")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize race {id}")]
    Serialize {
        id: String,
        #[source]
        source: toml::ser::Error,
    },

    #[error("race {id} not found")]
    NotFound { id: String },

    #[error("invalid race id '{id}'")]
    InvalidId { id: String },
}
