//! End-to-end CLI tests for the media-export binary.

#![allow(deprecated)]

mod support;

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use support::posts::{MockPost, endpoint, mount_media, mount_posts, mount_status};
use support::socket_guard::{socket_skip_return, start_mock_server_or_skip};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

/// Binary command isolated from the user's config file and log settings.
fn media_export(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("media-export").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let temp = TempDir::new().unwrap();
    media_export(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export the most recent media posts"))
        .stdout(predicate::str::contains("--count"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let temp = TempDir::new().unwrap();
    media_export(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("media-export"));
}

#[test]
fn test_binary_count_out_of_range_is_rejected() {
    let temp = TempDir::new().unwrap();
    for value in ["0", "101"] {
        media_export(temp.path())
            .args(["--count", value])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("count"));
    }
}

#[test]
fn test_binary_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("media-export");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "concurrency = 500\n").unwrap();

    media_export(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config.toml"));
}

#[tokio::test]
async fn test_binary_full_export_writes_archive() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_posts(
        &server,
        &[
            MockPost::new("/media/one.jpg", Some("jpg"), "alice"),
            MockPost::new("/media/two.jpg", Some("jpg"), "alice"),
        ],
    )
    .await;
    mount_media(&server, "/media/one.jpg", b"one").await;
    mount_media(&server, "/media/two.jpg", b"two").await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out");

    media_export(temp.path())
        .arg("-e")
        .arg(endpoint(&server))
        .arg("-o")
        .arg(&output)
        .args(["-n", "2"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Fetched 2 posts"))
        .stdout(predicate::str::contains("Downloaded: alice.jpg"))
        .stdout(predicate::str::contains("Downloaded: alice_1.jpg"))
        .stdout(predicate::str::contains("media_files.zip"));

    let archive = std::fs::File::open(output.join("media_files.zip")).unwrap();
    assert_eq!(zip::ZipArchive::new(archive).unwrap().len(), 2);
}

#[tokio::test]
async fn test_binary_exit_code_partial_success_is_one() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_posts(
        &server,
        &[
            MockPost::new("/ok", Some("png"), "bob"),
            MockPost::new("/fail", Some("png"), "carol"),
        ],
    )
    .await;
    mount_media(&server, "/ok", b"PNG").await;
    mount_status(&server, "/fail", 404).await;

    let temp = TempDir::new().unwrap();

    let assert = media_export(temp.path())
        .arg("--endpoint")
        .arg(endpoint(&server))
        .arg("--output-dir")
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to download a file"))
        .stdout(predicate::str::contains("1 of 2 items could not be downloaded"));
    assert_eq!(
        assert.get_output().status.code(),
        Some(1),
        "partial success must yield exit code 1"
    );
    assert!(temp.path().join("media_files.zip").is_file());
}

#[tokio::test]
async fn test_binary_all_downloads_failing_exits_two() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_posts(&server, &[MockPost::new("/gone", None, "dave")]).await;
    mount_status(&server, "/gone", 404).await;

    let temp = TempDir::new().unwrap();

    media_export(temp.path())
        .arg("-q")
        .arg("-e")
        .arg(endpoint(&server))
        .arg("-o")
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No files were successfully downloaded"));
    assert!(!temp.path().join("media_files.zip").exists());
}

#[tokio::test]
async fn test_binary_no_posts_exits_zero_without_archive() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_posts(&server, &[]).await;

    let temp = TempDir::new().unwrap();

    media_export(temp.path())
        .arg("-e")
        .arg(endpoint(&server))
        .arg("-o")
        .arg(temp.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No posts found."));
    assert!(!temp.path().join("media_files.zip").exists());
}

#[tokio::test]
async fn test_binary_gateway_error_exits_two() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();

    media_export(temp.path())
        .arg("-e")
        .arg(endpoint(&server))
        .arg("-o")
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("500"));
}

#[tokio::test]
async fn test_binary_endpoint_from_config_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    mount_posts(&server, &[MockPost::new("/clip", Some("mp4"), "erin")]).await;
    mount_media(&server, "/clip", b"clip").await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("exports");
    let config_dir = temp.path().join("media-export");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "endpoint = \"{}\"\noutput_dir = \"{}\"\nverbosity = \"quiet\"\n",
            endpoint(&server),
            output.display()
        ),
    )
    .unwrap();

    media_export(temp.path())
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
    assert!(output.join("media_files.zip").is_file());
}
