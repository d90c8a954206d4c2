//! End-to-end checkout behavior against local fixture repositories.

mod support;

use std::fs;

use firmsync_core::prelude::*;

use support::{Fixture, clone_head, system_git};

#[tokio::test]
async fn branch_without_sparse_folder_checks_out_whole_tree() {
    let fixture = Fixture::new();
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let result = downloader
        .checkout_branch(&fixture.url(), "", "main")
        .await
        .unwrap();

    assert_eq!(result.path, fixture.clone_dir());
    assert!(result.path.join("docs/guide.md").exists());
    assert_eq!(
        fs::read_to_string(result.path.join("firmware/src/main.c")).unwrap(),
        "v1\n"
    );
}

#[tokio::test]
async fn branch_with_sparse_folder_limits_working_tree() {
    let fixture = Fixture::new();
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let result = downloader
        .checkout_branch(&fixture.url(), "firmware/src", "main")
        .await
        .unwrap();

    assert_eq!(result.path, fixture.clone_dir().join("firmware/src"));
    assert!(result.path.join("main.c").exists());
    assert!(!fixture.clone_dir().join("docs/guide.md").exists());
}

#[tokio::test]
async fn root_marker_returns_repository_root() {
    let fixture = Fixture::new();
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let result = downloader
        .checkout_branch(&fixture.url(), "/", "main")
        .await
        .unwrap();

    assert_eq!(result.path, fixture.clone_dir());
    assert!(result.path.join("docs/guide.md").exists());
}

#[tokio::test]
async fn second_tag_checkout_refreshes_instead_of_recloning() {
    let fixture = Fixture::new();
    let first = fixture.head();
    fixture.tag("v1.0", first);
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);
    let url = fixture.url();

    let result = downloader.checkout_tag(&url, "", "v1.0").await.unwrap();
    let main_c = result.path.join("firmware/src/main.c");
    assert_eq!(fs::read_to_string(&main_c).unwrap(), "v1\n");

    // Survives only if the clone is reused.
    let marker = fixture.clone_dir().join("untracked-marker");
    fs::write(&marker, "keep").unwrap();
    fs::write(&main_c, "local edit\n").unwrap();

    fixture.write("firmware/src/main.c", "v2\n");
    let second = fixture.commit_all("bump");
    fixture.tag("v2.0", second);

    let result = downloader.checkout_tag(&url, "", "v2.0").await.unwrap();

    assert_eq!(result.path, fixture.clone_dir());
    assert!(marker.exists(), "existing clone should not be replaced");
    assert_eq!(fs::read_to_string(&main_c).unwrap(), "v2\n");
    assert_eq!(clone_head(&fixture.clone_dir()).0, second.to_string());
}

#[tokio::test]
async fn commit_checkout_detaches_at_that_commit() {
    let fixture = Fixture::new();
    let first = fixture.head();
    fixture.write("firmware/src/main.c", "v2\n");
    fixture.commit_all("bump");
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let result = downloader
        .checkout_commit(&fixture.url(), "firmware/src", &first.to_string())
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(result.path.join("main.c")).unwrap(),
        "v1\n"
    );
    let (head, detached) = clone_head(&fixture.clone_dir());
    assert_eq!(head, first.to_string());
    assert!(detached);
}

#[tokio::test]
async fn branch_checkout_follows_remote_head() {
    let fixture = Fixture::new();
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);
    let url = fixture.url();

    downloader.checkout_branch(&url, "", "main").await.unwrap();

    fixture.write("firmware/src/main.c", "v3\n");
    let latest = fixture.commit_all("advance main");

    let result = downloader.checkout_branch(&url, "", "main").await.unwrap();

    assert_eq!(
        fs::read_to_string(result.path.join("firmware/src/main.c")).unwrap(),
        "v3\n"
    );
    let (head, detached) = clone_head(&fixture.clone_dir());
    assert_eq!(head, latest.to_string());
    assert!(detached, "branches are checked out through origin/<branch>");
}

#[tokio::test]
async fn missing_tag_rejects_without_result() {
    let fixture = Fixture::new();
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let err = downloader
        .checkout_tag(&fixture.url(), "", "v9.9.9")
        .await
        .unwrap_err();

    assert!(err.is_subprocess_failure(), "unexpected error: {err:?}");
    assert!(err.to_string().contains("checkout v9.9.9"));
}

#[tokio::test]
async fn invalid_request_touches_nothing() {
    let fixture = Fixture::new();
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let err = downloader
        .checkout_tag(&fixture.url(), "", "")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidRequest(_)));
    assert!(!fixture.base_dir().exists());
}

#[tokio::test]
async fn concurrent_downloaders_share_one_clone() {
    let fixture = Fixture::new();
    let git = system_git().await;
    let a = FirmwareDownloader::new(fixture.base_dir(), &git);
    let b = FirmwareDownloader::new(fixture.base_dir(), &git);
    let url = fixture.url();

    let (left, right) = tokio::join!(
        a.checkout_branch(&url, "", "main"),
        b.checkout_branch(&url, "", "main")
    );

    assert_eq!(left.unwrap().path, fixture.clone_dir());
    assert_eq!(right.unwrap().path, fixture.clone_dir());
    assert!(fixture.clone_dir().join("docs/guide.md").exists());
}

#[tokio::test]
async fn fetch_resolves_api_options() {
    let fixture = Fixture::new();
    fixture.tag("v1.0", fixture.head());
    let downloader = FirmwareDownloader::new(fixture.base_dir(), &system_git().await);

    let options = TargetDeviceOptions {
        source: FirmwareSource::GitTag,
        git_tag: "v1.0".into(),
        ..Default::default()
    };
    let result = downloader
        .fetch(&options, &fixture.url(), "firmware/src")
        .await
        .unwrap();
    assert_eq!(result.path, fixture.clone_dir().join("firmware/src"));

    let local = TargetDeviceOptions {
        source: FirmwareSource::LocalPath,
        local_path: fixture.origin_path().to_string_lossy().into_owned(),
        ..Default::default()
    };
    let result = downloader
        .fetch(&local, &fixture.url(), "firmware/src")
        .await
        .unwrap();
    assert_eq!(result.path, fixture.origin_path());

    let missing = TargetDeviceOptions {
        source: FirmwareSource::LocalPath,
        local_path: fixture.temp.path().join("nope").to_string_lossy().into_owned(),
        ..Default::default()
    };
    assert!(
        downloader
            .fetch(&missing, &fixture.url(), "")
            .await
            .is_err()
    );
}
