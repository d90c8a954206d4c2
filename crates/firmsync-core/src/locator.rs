//! Git executable discovery.
//!
//! Walks an ordered search path and probes each candidate with `--version`.
//! The first candidate that answers successfully wins.

use std::path::{Component, Path, PathBuf};

use semver::Version;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{FetchError, Result};
use crate::process::ProcessRunner;

/// Executable names tried in each directory, in order.
#[cfg(windows)]
pub const CANDIDATE_NAMES: &[&str] = &["git.exe", "git"];
#[cfg(not(windows))]
pub const CANDIDATE_NAMES: &[&str] = &["git"];

/// Oldest git release shipping `git sparse-checkout`.
const MIN_SPARSE_VERSION: Version = Version::new(2, 25, 0);

static SHARED_GIT: OnceCell<GitExecutable> = OnceCell::const_new();

/// A git binary that answered `--version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitExecutable {
    path: PathBuf,
    version: Option<Version>,
}

impl GitExecutable {
    pub fn new(path: impl Into<PathBuf>, version: Option<Version>) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version parsed from `git --version`, if the output was recognizable.
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Process-wide git executable, located on first use.
    ///
    /// Concurrent first callers share one search. A failed search is not
    /// cached, so a later call searches again. Once resolved, the result is
    /// kept for the lifetime of the process regardless of `search_path`.
    pub async fn shared(search_path: &[PathBuf]) -> Result<&'static GitExecutable> {
        SHARED_GIT
            .get_or_try_init(|| locate(search_path))
            .await
    }
}

/// Search `search_path` for a working git executable.
pub async fn locate(search_path: &[PathBuf]) -> Result<GitExecutable> {
    for candidate in candidates(search_path) {
        match probe(&candidate).await {
            Ok(Some(git)) => {
                info!(path = %git.path.display(), version = ?git.version, "Confirmed git executable");
                if let Some(version) = &git.version
                    && *version < MIN_SPARSE_VERSION
                {
                    warn!(
                        %version,
                        "git older than {} lacks sparse-checkout support",
                        MIN_SPARSE_VERSION
                    );
                }
                return Ok(git);
            }
            Ok(None) => {}
            Err(err) => warn!(path = %candidate.display(), error = %err, "Git probe failed"),
        }
    }

    Err(FetchError::ExecutableNotFound {
        searched: search_path.len(),
    })
}

/// All candidate paths in probe order: directories first, names as tie-break.
pub fn candidates(search_path: &[PathBuf]) -> Vec<PathBuf> {
    search_path
        .iter()
        .flat_map(|dir| {
            CANDIDATE_NAMES
                .iter()
                .map(move |name| strip_quotes(&normalize(&dir.join(name))))
        })
        .collect()
}

/// Probe one candidate. `Ok(None)` means "not a usable git, keep looking".
async fn probe(candidate: &Path) -> Result<Option<GitExecutable>> {
    let is_file = tokio::fs::metadata(candidate)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Ok(None);
    }

    debug!(path = %candidate.display(), "Testing git executable");
    let output = ProcessRunner::new(candidate).output(["--version"]).await?;
    if !output.success() {
        debug!(path = %candidate.display(), status = %output.status, "Git probe exited unsuccessfully");
        return Ok(None);
    }

    Ok(Some(GitExecutable::new(
        candidate,
        parse_git_version(&output.stdout),
    )))
}

/// Parse `git version 2.43.0` (and vendor suffixes like `.windows.1`).
pub fn parse_git_version(stdout: &str) -> Option<Version> {
    let raw = stdout.split_whitespace().nth(2)?;
    let mut parts = raw.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next()?.ok()?;
    let patch = parts.next().and_then(|p| p.ok()).unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Search path entries are sometimes quoted (`"C:\Program Files\Git\cmd"`).
fn strip_quotes(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains('"') => PathBuf::from(s.replace('"', "")),
        _ => path.to_path_buf(),
    }
}
