//! Snapshot storage errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("snapshot already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("invalid snapshot name '{0}'")]
    InvalidName(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("snapshot command succeeded but {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("{0}")]
    Backend(String),
}

impl OpsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            OpsError::NotFound(path.into())
        } else {
            OpsError::Io {
                path: path.into(),
                source,
            }
        }
    }
}
