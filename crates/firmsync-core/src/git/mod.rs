//! Git operations for fetching firmware sources.
//!
//! This module drives an external git client:
//! - Cloning repositories without checkout, filtered to skip blobs
//! - Restricting the working tree with sparse checkout
//! - Refreshing existing clones and checking out tags, branches or commits

pub mod checkout;
mod lock;
pub mod spec;
pub mod sync;

pub use checkout::FirmwareDownloader;
pub use spec::{
    FirmwareResult, LocalCheckout, ROOT_FOLDER, RefKind, RepositoryRef, repo_dir, repo_name,
};
pub use sync::{RepositorySynchronizer, SyncOutcome};
