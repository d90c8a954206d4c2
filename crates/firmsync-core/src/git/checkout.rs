//! Checking out tags, branches and commits into the local clone.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::locator::GitExecutable;
use crate::options::{FirmwareRequest, TargetDeviceOptions};

use super::lock::directory_lock;
use super::spec::{FirmwareResult, RefKind, RepositoryRef};
use super::sync::RepositorySynchronizer;

/// Fetches firmware sources from git into a base directory.
#[derive(Debug, Clone)]
pub struct FirmwareDownloader {
    synchronizer: RepositorySynchronizer,
}

impl FirmwareDownloader {
    pub fn new(base_directory: impl Into<PathBuf>, git: &GitExecutable) -> Self {
        Self {
            synchronizer: RepositorySynchronizer::new(base_directory, git),
        }
    }

    /// Build a downloader from configuration, locating git on first use in
    /// this process.
    pub async fn from_config(config: &FetchConfig) -> Result<Self> {
        let git = GitExecutable::shared(&config.search_path).await?;
        Ok(Self::new(config.base_directory.clone(), git))
    }

    pub fn base_directory(&self) -> &Path {
        self.synchronizer.base_directory()
    }

    pub fn synchronizer(&self) -> &RepositorySynchronizer {
        &self.synchronizer
    }

    /// Synchronize the repository, then check out the requested ref.
    ///
    /// Returns the sparse sub-folder path, or the clone root when no sparse
    /// folder was given. Nothing is returned if any step fails.
    pub async fn checkout(&self, request: &RepositoryRef) -> Result<FirmwareResult> {
        request.validate()?;
        let layout = request.local_checkout(self.base_directory())?;

        let lock = directory_lock(&layout.repo_dir);
        let _guard = lock.lock().await;

        let outcome = self
            .synchronizer
            .sync(&request.url, &request.sparse_folder)
            .await?;
        debug!(?outcome, dir = %layout.repo_dir.display(), "Repository synchronized");

        let target = request.checkout_target();
        info!(kind = %request.kind, target = %target, "Checking out");
        self.synchronizer
            .git_in(&layout.repo_dir)
            .run(["checkout", target.as_str()])
            .await?;

        Ok(FirmwareResult {
            path: layout.resolved_path,
        })
    }

    pub async fn checkout_tag(
        &self,
        repository: &str,
        sparse_folder: &str,
        tag: &str,
    ) -> Result<FirmwareResult> {
        self.checkout(
            &RepositoryRef::new(repository, RefKind::Tag, tag).with_sparse_folder(sparse_folder),
        )
        .await
    }

    /// Check out `origin/<branch>`, never a local branch.
    pub async fn checkout_branch(
        &self,
        repository: &str,
        sparse_folder: &str,
        branch: &str,
    ) -> Result<FirmwareResult> {
        self.checkout(
            &RepositoryRef::new(repository, RefKind::Branch, branch)
                .with_sparse_folder(sparse_folder),
        )
        .await
    }

    pub async fn checkout_commit(
        &self,
        repository: &str,
        sparse_folder: &str,
        commit: &str,
    ) -> Result<FirmwareResult> {
        self.checkout(
            &RepositoryRef::new(repository, RefKind::Commit, commit)
                .with_sparse_folder(sparse_folder),
        )
        .await
    }

    /// Fetch firmware sources described by API options.
    ///
    /// Git sources are checked out under the base directory; a local path is
    /// returned as-is once it is confirmed to be a directory.
    pub async fn fetch(
        &self,
        options: &TargetDeviceOptions,
        repository: &str,
        sparse_folder: &str,
    ) -> Result<FirmwareResult> {
        match options.resolve(repository, sparse_folder)? {
            FirmwareRequest::Git(request) => self.checkout(&request).await,
            FirmwareRequest::Local(path) => {
                let is_dir = tokio::fs::metadata(&path)
                    .await
                    .map(|meta| meta.is_dir())
                    .unwrap_or(false);
                if !is_dir {
                    return Err(FetchError::InvalidRequest(format!(
                        "local firmware path is not a directory: {}",
                        path.display()
                    )));
                }
                Ok(FirmwareResult { path })
            }
        }
    }
}
