//! Repository synchronization: clone on first use, reset and fetch afterwards.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{FetchError, Result};
use crate::locator::GitExecutable;
use crate::process::ProcessRunner;

use super::spec::{repo_dir, sparse_path};

/// What `sync` had to do to bring the local clone up to date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The directory was empty and a fresh clone was made.
    Cloned,
    /// An existing clone was hard-reset and its tags fetched.
    Refreshed,
}

/// Keeps one local clone per repository basename under a base directory.
///
/// All git subprocesses started by one synchronizer (and its clones) run one
/// at a time. The base directory is made absolute on construction, so every
/// git command runs with an absolute working directory.
#[derive(Debug, Clone)]
pub struct RepositorySynchronizer {
    base_directory: PathBuf,
    git: ProcessRunner,
}

impl RepositorySynchronizer {
    pub fn new(base_directory: impl Into<PathBuf>, git: &GitExecutable) -> Self {
        let base_directory = base_directory.into();
        let base_directory = std::path::absolute(&base_directory).unwrap_or(base_directory);
        Self {
            base_directory,
            git: ProcessRunner::new(git.path()).max_concurrent(1),
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Local clone directory for `url`.
    pub fn repo_dir(&self, url: &str) -> Result<PathBuf> {
        repo_dir(&self.base_directory, url)
    }

    /// Git runner bound to `dir`, sharing this synchronizer's concurrency bound.
    pub(crate) fn git_in(&self, dir: &Path) -> ProcessRunner {
        self.git.clone().in_dir(dir)
    }

    /// Make sure a clone of `url` exists locally and is up to date.
    ///
    /// An empty (or missing) directory gets a blobless clone without checkout,
    /// followed by either a full checkout or a sparse-checkout of
    /// `sparse_folder`. A populated directory is hard-reset and fetches tags
    /// from `origin`; its sparse settings are left as they were.
    pub async fn sync(&self, url: &str, sparse_folder: &str) -> Result<SyncOutcome> {
        let dir = self.repo_dir(url)?;

        if !tokio::fs::try_exists(&dir)
            .await
            .map_err(|e| FetchError::filesystem(&dir, e))?
        {
            debug!(dir = %dir.display(), "Creating repository directory");
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| FetchError::filesystem(&dir, e))?;
        }

        let git = self.git_in(&dir);

        if is_empty_dir(&dir).await? {
            info!(url, dir = %dir.display(), "Cloning repository");
            git.run([
                OsStr::new("clone"),
                OsStr::new("--no-checkout"),
                OsStr::new("--filter=blob:none"),
                OsStr::new(url),
                OsStr::new("."),
            ])
            .await?;

            match sparse_path(sparse_folder) {
                None => {
                    debug!(dir = %dir.display(), "Checking out full tree");
                    git.run(["checkout"]).await?;
                }
                Some(folder) => {
                    debug!(dir = %dir.display(), folder, "Configuring sparse checkout");
                    git.run(["sparse-checkout", "set", folder]).await?;
                }
            }
            return Ok(SyncOutcome::Cloned);
        }

        // Without its own .git, git would walk up to an enclosing repository.
        if !tokio::fs::try_exists(dir.join(".git"))
            .await
            .map_err(|e| FetchError::filesystem(&dir, e))?
        {
            return Err(FetchError::NotAClone { path: dir });
        }

        info!(url, dir = %dir.display(), "Refreshing existing clone");
        git.run(["reset", "--hard"]).await?;
        git.run(["fetch", "origin", "--tags"]).await?;
        Ok(SyncOutcome::Refreshed)
    }
}

async fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| FetchError::filesystem(path, e))?;
    let first = entries
        .next_entry()
        .await
        .map_err(|e| FetchError::filesystem(path, e))?;
    Ok(first.is_none())
}
