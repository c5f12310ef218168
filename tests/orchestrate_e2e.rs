//! End-to-end orchestrate runs against a local clone with a file remote.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as GitCommand;

use assert_cmd::Command;
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_git(dir: &Path, args: &[&str]) {
    let status = GitCommand::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("git runs");
    assert!(status.success(), "git {args:?} failed in {}", dir.display());
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = GitCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git runs");
    assert!(output.status.success(), "git {args:?} failed in {}", dir.display());
    String::from_utf8(output.stdout).expect("utf-8 git output").trim().to_string()
}

/// Bare `remote.git` plus a `site` clone on master with an initial
/// `_data/publist.yml` committed and pushed.
fn init_site_repo(root: &Path) -> (PathBuf, PathBuf) {
    let remote = root.join("remote.git");
    run_git(root, &["init", "--bare", "remote.git"]);

    let site = root.join("site");
    run_git(root, &["clone", "remote.git", "site"]);
    run_git(&site, &["checkout", "-b", "master"]);
    run_git(&site, &["config", "user.email", "ci@example.invalid"]);
    run_git(&site, &["config", "user.name", "publist-sync tests"]);

    fs::create_dir(site.join("_data")).expect("create _data");
    fs::write(site.join("_data/publist.yml"), "- title: old entry\n").expect("seed publist");
    run_git(&site, &["add", "_data/publist.yml"]);
    run_git(&site, &["commit", "-m", "initial"]);
    run_git(&site, &["push", "-u", "origin", "master"]);

    (remote, site)
}

async fn mount_publication(server: &MockServer, title: &str) {
    Mock::given(method("GET"))
        .and(path("/project/520617"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outputs": [{"pureId": "111"}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/outputs"))
        .and(query_param("guids", "111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "publications": [{
                "title": title,
                "doi": "https://doi.org/10.1000/182",
                "harvard": null,
                "persons": [
                    {"firstname": "Ada", "lastname": "Lovelace", "role": "Author"}
                ]
            }]
        })))
        .mount(server)
        .await;
}

fn orchestrate(workdir: &Path, repo: &Path, base_url: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("publist-sync").expect("binary exists");
    cmd.arg("orchestrate")
        .arg(repo)
        .current_dir(workdir)
        .env("PURE_BASE_URL", base_url)
        .env("PURE_PROJECT_ID", "520617");
    cmd.assert()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn orchestrate_updates_commits_pushes_and_logs() {
    let root = TempDir::new().expect("temp dir");
    let (remote, site) = init_site_repo(root.path());
    let workdir = root.path().join("work");
    fs::create_dir(&workdir).unwrap();

    let server = MockServer::start().await;
    mount_publication(&server, "Synchronised Publication").await;
    let base_url = server.uri();

    let (workdir_arg, site_arg) = (workdir.clone(), site.clone());
    tokio::task::spawn_blocking(move || {
        orchestrate(&workdir_arg, &site_arg, &base_url).success();
    })
    .await
    .expect("task joins");

    // The publication file is regenerated in place.
    let publist = fs::read_to_string(site.join("_data/publist.yml")).unwrap();
    assert!(publist.contains("Synchronised Publication"));
    assert!(!publist.contains("old entry"));

    // The change reached the remote as one new commit.
    let subject = git_stdout(root.path(), &["--git-dir", remote.to_str().unwrap(), "log", "-1", "--format=%s"]);
    assert_eq!(subject, "Update publications");

    // Exactly one log record for the run outcome.
    let log = fs::read_to_string(workdir.join("orchestration.log")).unwrap();
    assert!(log.contains("Publication update pushed"), "log was: {log}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn second_run_with_unchanged_list_pushes_nothing() {
    let root = TempDir::new().expect("temp dir");
    let (remote, site) = init_site_repo(root.path());
    let workdir = root.path().join("work");
    fs::create_dir(&workdir).unwrap();

    let server = MockServer::start().await;
    mount_publication(&server, "Stable Publication").await;
    let base_url = server.uri();

    for _ in 0..2 {
        let (workdir_arg, site_arg, url) = (workdir.clone(), site.clone(), base_url.clone());
        tokio::task::spawn_blocking(move || {
            orchestrate(&workdir_arg, &site_arg, &url).success();
        })
        .await
        .expect("task joins");
    }

    // Initial commit plus exactly one update commit.
    let count = git_stdout(
        root.path(),
        &["--git-dir", remote.to_str().unwrap(), "rev-list", "--count", "master"],
    );
    assert_eq!(count, "2");

    let log = fs::read_to_string(workdir.join("orchestration.log")).unwrap();
    assert!(log.contains("nothing to push"), "log was: {log}");
}

#[test]
#[serial]
fn orchestrate_fails_cleanly_when_data_directory_is_missing() {
    let root = TempDir::new().expect("temp dir");
    let site = root.path().join("site");
    fs::create_dir(&site).unwrap();
    let workdir = root.path().join("work");
    fs::create_dir(&workdir).unwrap();

    orchestrate(&workdir, &site, "http://127.0.0.1:9").failure();

    // No publication file appears in an unintended location, and the
    // failure leaves a log record.
    assert!(!site.join("_data").exists());
    let log = fs::read_to_string(workdir.join("orchestration.log")).unwrap();
    assert!(log.contains("Aborted publication update"), "log was: {log}");
}

#[test]
#[serial]
fn orchestrate_fails_cleanly_when_repository_does_not_exist() {
    let root = TempDir::new().expect("temp dir");
    let workdir = root.path().join("work");
    fs::create_dir(&workdir).unwrap();

    orchestrate(&workdir, &root.path().join("missing"), "http://127.0.0.1:9").failure();

    let log = fs::read_to_string(workdir.join("orchestration.log")).unwrap();
    assert!(log.contains("does not exist"), "log was: {log}");
}
