//! Binary-level tests: argument parsing, exit codes and error reporting.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_VARS: [&str; 6] = [
    "MYSQL_HOST",
    "MYSQL_USER",
    "MYSQL_PWD",
    "MYSQL_DB",
    "WEB_SERVER_HOST",
    "WEB_SERVER_PORT",
];

fn testbed(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("testbed").unwrap();
    cmd.current_dir(workdir.path()).env("NO_COLOR", "1");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_every_command() {
    let dir = TempDir::new().unwrap();

    testbed(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("database"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("reactivate"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn no_command_prints_usage_hint() {
    let dir = TempDir::new().unwrap();

    testbed(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("testbed --help"));
}

#[test]
fn reactivate_without_server_host_fails() {
    let dir = TempDir::new().unwrap();

    testbed(&dir)
        .arg("reactivate")
        .env("WEB_SERVER_PORT", "8000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("WEB_SERVER_HOST"));
}

#[test]
fn install_without_fetched_tree_fails() {
    let dir = TempDir::new().unwrap();

    testbed(&dir)
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run 'testbed fetch' first"));
}

#[test]
fn clean_removes_workspace() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("tmp/typecho-master/usr")).unwrap();

    testbed(&dir).arg("clean").assert().success();

    assert!(!dir.path().join("tmp").exists());
}

#[test]
fn clean_keep_root_leaves_empty_workspace() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("tmp/typecho-master")).unwrap();
    std::fs::write(dir.path().join("tmp/master.tar.gz"), b"gz").unwrap();

    testbed(&dir)
        .args(["clean", "--keep-root"])
        .assert()
        .success();

    let workspace = dir.path().join("tmp");
    assert!(workspace.is_dir());
    assert_eq!(std::fs::read_dir(workspace).unwrap().count(), 0);
}

#[test]
fn invalid_archive_url_is_rejected() {
    let dir = TempDir::new().unwrap();

    testbed(&dir)
        .args(["fetch", "--archive-url", "typecho/master.tar.gz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive URL"));
}
