//! Target device options as received from the API layer.
//!
//! These mirror the upstream argument set. `resolve` turns them into either a
//! git checkout request or a local path.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};
use crate::git::{RefKind, RepositoryRef};

pub const DEFAULT_TARGET: &str = "DIY_2400_TX_ESP32_SX1280_E28_via_UART";

/// Where the firmware sources come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FirmwareSource {
    #[default]
    GitBranch,
    GitTag,
    GitCommit,
    LocalPath,
}

/// A pull request, fetched at its head commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub head_commit_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetDeviceOptions {
    pub target: String,
    pub source: FirmwareSource,
    pub git_tag: String,
    pub git_branch: String,
    pub git_commit: String,
    pub local_path: String,
    pub git_pull_request: Option<PullRequest>,
}

impl Default for TargetDeviceOptions {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            source: FirmwareSource::GitBranch,
            git_tag: String::new(),
            git_branch: String::new(),
            git_commit: String::new(),
            local_path: String::new(),
            git_pull_request: None,
        }
    }
}

/// What a set of options asks the downloader to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirmwareRequest {
    Git(RepositoryRef),
    Local(PathBuf),
}

impl TargetDeviceOptions {
    /// Build the request for `repository` / `sparse_folder`.
    ///
    /// A pull request overrides the selected git ref with its head commit.
    pub fn resolve(&self, repository: &str, sparse_folder: &str) -> Result<FirmwareRequest> {
        let (kind, value) = match (self.source, &self.git_pull_request) {
            (FirmwareSource::LocalPath, _) => {
                if self.local_path.trim().is_empty() {
                    return Err(FetchError::InvalidRequest(
                        "local path source selected but no path given".to_string(),
                    ));
                }
                return Ok(FirmwareRequest::Local(PathBuf::from(&self.local_path)));
            }
            (_, Some(pr)) => (RefKind::Commit, pr.head_commit_hash.as_str()),
            (FirmwareSource::GitTag, None) => (RefKind::Tag, self.git_tag.as_str()),
            (FirmwareSource::GitBranch, None) => (RefKind::Branch, self.git_branch.as_str()),
            (FirmwareSource::GitCommit, None) => (RefKind::Commit, self.git_commit.as_str()),
        };

        let request =
            RepositoryRef::new(repository, kind, value).with_sparse_folder(sparse_folder);
        request.validate()?;
        Ok(FirmwareRequest::Git(request))
    }
}
