//! Subprocess execution.
//!
//! `ProcessRunner` wraps an executable path, an optional working directory and
//! an optional concurrency bound. Every git invocation in this crate goes
//! through it.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Semaphore;

use crate::error::{FetchError, Result};

/// Inherited variables that would point git at a repository other than `cwd`.
const GIT_ENV_OVERRIDES: [&str; 4] = [
    "GIT_DIR",
    "GIT_WORK_TREE",
    "GIT_INDEX_FILE",
    "GIT_COMMON_DIR",
];

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Spawns one executable with varying arguments.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    cwd: Option<PathBuf>,
    permits: Option<Arc<Semaphore>>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            cwd: None,
            permits: None,
        }
    }

    /// Run every subprocess with `dir` as its working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Allow at most `limit` subprocesses from this runner (and its clones) at once.
    pub fn max_concurrent(mut self, limit: usize) -> Self {
        self.permits = Some(Arc::new(Semaphore::new(limit.max(1))));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Run to completion and capture output, whatever the exit status.
    ///
    /// Fails only when the process cannot be spawned.
    pub async fn output<I, S>(&self, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();

        let _permit = match &self.permits {
            Some(permits) => Some(permits.acquire().await.map_err(|_| FetchError::Spawn {
                command: self.describe(&args),
                source: std::io::Error::other("process runner was shut down"),
            })?),
            None => None,
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for key in GIT_ENV_OVERRIDES {
            cmd.env_remove(key);
        }
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| FetchError::Spawn {
            command: self.describe(&args),
            source,
        })?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run to completion, turning a non-zero exit into [`FetchError::Subprocess`].
    pub async fn run<I, S>(&self, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let output = self.output(&args).await?;
        if !output.success() {
            return Err(FetchError::Subprocess {
                command: self.describe(&args),
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    fn describe(&self, args: &[OsString]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}
