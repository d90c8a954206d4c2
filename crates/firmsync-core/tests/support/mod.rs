//! Fixture repositories built with git2.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;

use firmsync_core::locator::{GitExecutable, locate};

/// A temp dir holding an origin repository and an empty base directory.
pub struct Fixture {
    pub temp: TempDir,
    pub origin: Repository,
}

impl Fixture {
    /// Origin at `<temp>/ExpressLRS` with `firmware/src/main.c` and `docs/guide.md`
    /// on `main`.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("ExpressLRS");
        fs::create_dir_all(&root).unwrap();
        let origin = Repository::init(&root).unwrap();
        origin.set_head("refs/heads/main").unwrap();

        let fixture = Self { temp, origin };
        fixture.write("firmware/src/main.c", "v1\n");
        fixture.write("docs/guide.md", "# Guide\n");
        fixture.write("README.md", "ExpressLRS\n");
        fixture.commit_all("init");
        fixture
    }

    pub fn origin_path(&self) -> &Path {
        self.origin.workdir().unwrap()
    }

    pub fn url(&self) -> String {
        url::Url::from_directory_path(self.origin_path())
            .expect("repo root should convert to file URL")
            .to_string()
    }

    pub fn base_dir(&self) -> PathBuf {
        self.temp.path().join("base")
    }

    /// Where the downloader should put this repository's clone.
    pub fn clone_dir(&self) -> PathBuf {
        self.base_dir().join("ExpressLRS")
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.origin_path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn commit_all(&self, message: &str) -> Oid {
        let repo = &self.origin;
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();

        match repo.head() {
            Ok(head) => {
                let parent = repo.find_commit(head.target().unwrap()).unwrap();
                repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                    .unwrap()
            }
            Err(_) => repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
                .unwrap(),
        }
    }

    pub fn tag(&self, name: &str, commit: Oid) {
        let object = self.origin.find_object(commit, None).unwrap();
        self.origin.tag_lightweight(name, &object, false).unwrap();
    }

    pub fn head(&self) -> Oid {
        self.origin.head().unwrap().target().unwrap()
    }
}

/// The git binary found on `PATH`.
pub async fn system_git() -> GitExecutable {
    let search: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();
    locate(&search).await.expect("git should be installed")
}

/// HEAD of a local clone and whether it is detached.
///
/// Read through the git CLI; partial clones may carry extensions libgit2
/// does not open.
pub fn clone_head(dir: &Path) -> (String, bool) {
    let rev = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .expect("Failed to run git rev-parse");
    assert!(rev.status.success(), "git rev-parse failed");
    let symbolic = Command::new("git")
        .args(["symbolic-ref", "-q", "HEAD"])
        .current_dir(dir)
        .status()
        .expect("Failed to run git symbolic-ref");
    (
        String::from_utf8_lossy(&rev.stdout).trim().to_string(),
        !symbolic.success(),
    )
}
