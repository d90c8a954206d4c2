//! Error types for firmware fetching.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout firmsync-core.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors raised while locating git, synchronizing a repository or checking out a ref.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No directory on the search path held a git binary that answered `--version`.
    #[error("git executable not found in {searched} search path entries")]
    ExecutableNotFound { searched: usize },

    /// The subprocess could not be started at all.
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The subprocess ran but exited unsuccessfully.
    #[error("`{command}` failed ({status}): {stderr}")]
    Subprocess {
        command: String,
        status: String,
        stderr: String,
    },

    /// A directory could not be created or listed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A non-empty repository directory holds no git clone.
    #[error("{} is not empty and is not a git clone", .path.display())]
    NotAClone { path: PathBuf },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// True for failures reported by a git subprocess (spawn or non-zero exit).
    pub fn is_subprocess_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::Subprocess { .. })
    }
}
