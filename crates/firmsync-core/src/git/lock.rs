//! In-process locks keyed by local clone directory.
//!
//! Two downloaders in one process may target the same clone; each
//! sync-then-checkout sequence holds the directory's lock for its duration.
//! Other processes are not excluded.
//!
//! Entries are never evicted: one per clone directory used by the process.
//! Keys are the absolute paths produced by `RepositorySynchronizer`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

static DIRECTORY_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Shared lock for `dir`; the same directory always yields the same lock.
pub(crate) fn directory_lock(dir: &Path) -> Arc<AsyncMutex<()>> {
    let mut locks = DIRECTORY_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks
        .entry(dir.to_path_buf())
        .or_insert_with(|| Arc::new(AsyncMutex::new(())))
        .clone()
}
