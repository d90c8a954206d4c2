//! Repository reference types.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FetchError, Result};

/// Marker meaning "no sparse restriction".
pub const ROOT_FOLDER: &str = "/";

/// Kind of git reference to check out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefKind {
    Tag,
    Branch,
    Commit,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Tag => write!(f, "tag"),
            RefKind::Branch => write!(f, "branch"),
            RefKind::Commit => write!(f, "commit"),
        }
    }
}

/// A repository, an optional sparse sub-folder and the ref to check out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Remote URL handed to `git clone`
    pub url: String,
    /// Sub-folder to restrict the checkout to; empty or `/` for the whole tree
    #[serde(default)]
    pub sparse_folder: String,
    pub kind: RefKind,
    /// Tag name, branch name or commit hash
    pub value: String,
}

impl RepositoryRef {
    pub fn new(url: impl Into<String>, kind: RefKind, value: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sparse_folder: String::new(),
            kind,
            value: value.into(),
        }
    }

    pub fn tag(url: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(url, RefKind::Tag, tag)
    }

    pub fn branch(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self::new(url, RefKind::Branch, branch)
    }

    pub fn commit(url: impl Into<String>, commit: impl Into<String>) -> Self {
        Self::new(url, RefKind::Commit, commit)
    }

    /// Set the sparse sub-folder.
    pub fn with_sparse_folder(mut self, folder: impl Into<String>) -> Self {
        self.sparse_folder = folder.into();
        self
    }

    /// Argument passed to `git checkout`.
    ///
    /// Branches always resolve through the remote-tracking ref so a stale
    /// local branch is never used.
    pub fn checkout_target(&self) -> String {
        match self.kind {
            RefKind::Branch => format!("origin/{}", self.value),
            RefKind::Tag | RefKind::Commit => self.value.clone(),
        }
    }

    /// Sparse folder, or `None` when the whole tree is wanted.
    pub fn sparse_path(&self) -> Option<&str> {
        sparse_path(&self.sparse_folder)
    }

    /// Reject requests that cannot name a local checkout.
    pub fn validate(&self) -> Result<()> {
        if self.value.trim().is_empty() {
            return Err(FetchError::InvalidRequest(format!(
                "empty {} name for {}",
                self.kind, self.url
            )));
        }
        repo_name(&self.url)?;
        if let Some(folder) = self.sparse_path()
            && Path::new(folder)
                .components()
                .any(|c| {
                    matches!(
                        c,
                        Component::ParentDir | Component::RootDir | Component::Prefix(_)
                    )
                })
        {
            return Err(FetchError::InvalidRequest(format!(
                "sparse folder escapes the repository: {folder}"
            )));
        }
        Ok(())
    }

    /// Resolve the on-disk layout for this request under `base_directory`.
    pub fn local_checkout(&self, base_directory: &Path) -> Result<LocalCheckout> {
        let repo_dir = repo_dir(base_directory, &self.url)?;
        let resolved_path = match self.sparse_path() {
            Some(folder) => repo_dir.join(folder),
            None => repo_dir.clone(),
        };
        Ok(LocalCheckout {
            base_directory: base_directory.to_path_buf(),
            repo_dir,
            resolved_path,
        })
    }
}

/// Where a request lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCheckout {
    pub base_directory: PathBuf,
    /// `base_directory/basename(url)`
    pub repo_dir: PathBuf,
    /// `repo_dir` joined with the sparse folder
    pub resolved_path: PathBuf,
}

/// Path handed back to callers once a checkout completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareResult {
    pub path: PathBuf,
}

/// Sparse folder with leading slashes dropped, or `None` for the whole tree.
pub(crate) fn sparse_path(folder: &str) -> Option<&str> {
    let trimmed = folder.trim().trim_start_matches(ROOT_FOLDER);
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Last path segment of a repository URL, trailing slashes ignored.
///
/// Query strings and fragments of parseable URLs are not part of the name.
/// Two URLs with the same basename map to the same directory.
pub fn repo_name(url: &str) -> Result<String> {
    let path = match Url::parse(url) {
        Ok(parsed) if !parsed.cannot_be_a_base() => parsed.path().to_string(),
        _ => url.to_string(),
    };

    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .ok_or_else(|| FetchError::InvalidRequest(format!("repository URL has no name: {url}")))
}

/// `base_directory/basename(url)`.
pub fn repo_dir(base_directory: &Path, url: &str) -> Result<PathBuf> {
    Ok(base_directory.join(repo_name(url)?))
}
