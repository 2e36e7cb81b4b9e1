use super::*;
use crate::provision::NoProgress;
use crate::testing::{RecordingProgress, TempDirFixture, platform_archive};
use mockito::Server;

fn options_for(fixture: &TempDirFixture, url: &str) -> ProvisionOptions {
    ProvisionOptions {
        workspace: fixture.path().join("tmp"),
        archive_url: url.to_string(),
        tree_name: "typecho-master".to_string(),
        schema_dump: fixture.path().join("typecho.sql"),
        plugin_source: fixture.path().to_path_buf(),
    }
}

#[test]
fn test_archive_file_name() {
    assert_eq!(
        archive_file_name("https://github.com/typecho/typecho/archive/master.tar.gz"),
        "master.tar.gz"
    );
    assert_eq!(archive_file_name("http://host/a/b.tgz?x=1"), "b.tgz");
    assert_eq!(archive_file_name("http://host/"), FALLBACK_ARCHIVE_NAME);
    assert_eq!(archive_file_name("not a url"), FALLBACK_ARCHIVE_NAME);
}

#[test]
fn test_decompressed_path() {
    assert_eq!(
        decompressed_path(Path::new("/w/master.tar.gz")),
        PathBuf::from("/w/master.tar")
    );
    assert_eq!(
        decompressed_path(Path::new("/w/master.tgz")),
        PathBuf::from("/w/master.tar")
    );
    assert_eq!(
        decompressed_path(Path::new("/w/master.gz")),
        PathBuf::from("/w/master.tar")
    );
    assert_eq!(
        decompressed_path(Path::new("/w/master.tar")),
        PathBuf::from("/w/master.tar.tar")
    );
    assert_eq!(
        decompressed_path(Path::new("/w/archive")),
        PathBuf::from("/w/archive.tar")
    );
}

/// Hex noise so the gzip body stays well past one read buffer
fn incompressible_text(len: usize) -> String {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            char::from_digit((state % 16) as u32, 16).unwrap_or('0')
        })
        .collect()
}

#[tokio::test]
async fn test_gzip_served_under_tar_name_extracts() {
    let fixture = TempDirFixture::new().unwrap();
    let filler = incompressible_text(256 * 1024);
    let body = platform_archive(
        "typecho-master",
        &[("index.php", "<?php"), ("var/filler.txt", filler.as_str())],
    );
    assert!(body.len() > 64 * 1024);

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/archive/master.tar")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let options = options_for(&fixture, &format!("{}/archive/master.tar", server.url()));

    let tree = ArchiveFetcher::new(Client::new(), &options)
        .ensure_tree(&NoProgress)
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(tree.root().join("var/filler.txt")).unwrap(),
        filler
    );
    assert_eq!(
        std::fs::metadata(fixture.path().join("tmp/master.tar")).unwrap().len(),
        body.len() as u64
    );
}

#[tokio::test]
async fn test_existing_tree_skips_network() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.create_dir("tmp/typecho-master/var").unwrap();
    fixture.write_file("tmp/keep.txt", "stays").unwrap();

    // Nothing listens on the discard port; any request would fail
    let options = options_for(&fixture, "http://127.0.0.1:9/master.tar.gz");
    let progress = RecordingProgress::default();

    let tree = ArchiveFetcher::new(Client::new(), &options)
        .ensure_tree(&progress)
        .await
        .unwrap();

    assert_eq!(tree.root(), fixture.path().join("tmp/typecho-master"));
    assert!(fixture.file_exists("tmp/keep.txt"));
    assert!(progress.updates().is_empty());
}

#[tokio::test]
async fn test_download_and_extract_fresh_workspace() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_file("tmp/stale.txt", "left over").unwrap();

    let body = platform_archive(
        "typecho-master",
        &[("index.php", "<?php // index"), ("var/Typecho/Common.php", "<?php")],
    );

    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/archive/master.tar.gz")
        .with_status(200)
        .with_header("content-type", "application/x-gzip")
        .with_body(&body)
        .expect(1)
        .create_async()
        .await;

    let options = options_for(&fixture, &format!("{}/archive/master.tar.gz", server.url()));
    let progress = RecordingProgress::default();

    let tree = ArchiveFetcher::new(Client::new(), &options)
        .ensure_tree(&progress)
        .await
        .unwrap();

    mock.assert_async().await;

    assert!(tree.root().join("index.php").is_file());
    assert!(tree.root().join("var/Typecho/Common.php").is_file());
    assert!(!fixture.file_exists("tmp/stale.txt"));

    // Exactly one extracted tree next to the intermediate files
    let dirs: Vec<_> = std::fs::read_dir(fixture.path().join("tmp"))
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .collect();
    assert_eq!(dirs.len(), 1);

    let scaled = progress.scaled();
    assert!(!scaled.is_empty());
    assert!(scaled.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(scaled.last(), Some(&1000));
    assert!(progress.finished());
}

#[tokio::test]
async fn test_http_error_status_aborts() {
    let fixture = TempDirFixture::new().unwrap();

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/archive/master.tar.gz")
        .with_status(404)
        .create_async()
        .await;

    let options = options_for(&fixture, &format!("{}/archive/master.tar.gz", server.url()));

    let err = ArchiveFetcher::new(Client::new(), &options)
        .ensure_tree(&NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Download { .. }), "got {err:?}");
    assert!(!fixture.file_exists("tmp/typecho-master"));
}

#[tokio::test]
async fn test_corrupt_archive_is_fatal() {
    let fixture = TempDirFixture::new().unwrap();

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/archive/master.tar.gz")
        .with_status(200)
        .with_body("definitely not gzip")
        .create_async()
        .await;

    let options = options_for(&fixture, &format!("{}/archive/master.tar.gz", server.url()));

    let err = ArchiveFetcher::new(Client::new(), &options)
        .ensure_tree(&NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Archive { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_archive_without_expected_tree() {
    let fixture = TempDirFixture::new().unwrap();
    let body = platform_archive("typecho-1.2.1", &[("index.php", "<?php")]);

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/archive/master.tar.gz")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let options = options_for(&fixture, &format!("{}/archive/master.tar.gz", server.url()));

    let err = ArchiveFetcher::new(Client::new(), &options)
        .ensure_tree(&NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::MissingTree { .. }), "got {err:?}");
}
