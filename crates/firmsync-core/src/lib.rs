//! Firmsync Core Library
//!
//! Fetches firmware sources from git repositories into a local workspace,
//! driving an external git client. Supports tag, branch and commit checkouts
//! restricted to a sparse sub-folder.

pub mod config;
pub mod error;
pub mod git;
pub mod locator;
pub mod options;
pub mod process;

pub use error::{FetchError, Result};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::FetchConfig;

    // Errors
    pub use crate::error::{FetchError, Result};

    // Git
    pub use crate::git::{
        FirmwareDownloader, FirmwareResult, RefKind, RepositoryRef, RepositorySynchronizer,
        SyncOutcome,
    };

    // Executable discovery
    pub use crate::locator::GitExecutable;

    // API options
    pub use crate::options::{FirmwareRequest, FirmwareSource, PullRequest, TargetDeviceOptions};
}
