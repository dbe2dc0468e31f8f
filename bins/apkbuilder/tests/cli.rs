//! Binary smoke tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn apkbuilder(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("apkbuilder").unwrap();
    cmd.current_dir(dir)
        .env_remove("APKBUILDER_TOKEN")
        .env_remove("GITHUB_TOKEN")
        .env_remove("APKBUILDER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn init(dir: &Path, token: Option<&str>) {
    let mut cmd = apkbuilder(dir);
    cmd.args([
        "init",
        "--app-name",
        "Demo",
        "--package",
        "com.example.demo",
        "--repo",
        "https://github.com/acme/demo",
    ]);
    if let Some(token) = token {
        cmd.args(["--token", token]);
    }
    cmd.assert().success();
}

#[test]
fn test_help_documents_single_writer() {
    let dir = tempfile::tempdir().unwrap();
    apkbuilder(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("writer"))
        .stdout(predicate::str::contains("--expect-remote-head"));
}

#[test]
fn test_build_without_config_is_precondition() {
    let dir = tempfile::tempdir().unwrap();
    apkbuilder(dir.path())
        .args(["build", "release"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("apkbuilder.toml"));
}

#[test]
fn test_build_without_token_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), None);
    fs::write(dir.path().join("A.txt"), "hello").unwrap();

    apkbuilder(dir.path())
        .arg("build")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("token"));
    assert!(!dir.path().join(".git").exists());
}

#[test]
fn test_init_then_info_masks_token() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), Some("ghp_secretvalue"));

    let stored = fs::read_to_string(dir.path().join("apkbuilder.toml")).unwrap();
    assert!(!stored.contains("ghp_secretvalue"));

    apkbuilder(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"app_name\": \"Demo\""))
        .stdout(predicate::str::contains("ghp_…alue"))
        .stdout(predicate::str::contains("ghp_secretvalue").not());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), None);
    apkbuilder(dir.path())
        .args([
            "init",
            "--app-name",
            "Other",
            "--package",
            "com.example.other",
            "--repo",
            "https://github.com/acme/other",
        ])
        .assert()
        .code(3);
}

#[test]
fn test_init_rejects_bad_package() {
    let dir = tempfile::tempdir().unwrap();
    apkbuilder(dir.path())
        .args([
            "init",
            "--app-name",
            "Demo",
            "--package",
            "demo",
            "--repo",
            "https://github.com/acme/demo",
        ])
        .assert()
        .code(3);
    assert!(!dir.path().join("apkbuilder.toml").exists());
}

#[test]
fn test_set_name() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), None);
    apkbuilder(dir.path())
        .args(["set-name", "Renamed"])
        .assert()
        .success();

    let stored = fs::read_to_string(dir.path().join("apkbuilder.toml")).unwrap();
    assert!(stored.contains("app_name = \"Renamed\""));
}

#[test]
fn test_zip_leaves_out_config_and_git() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), Some("ghp_secretvalue"));
    fs::create_dir_all(dir.path().join("app/src")).unwrap();
    fs::write(dir.path().join("app/src/Main.kt"), "fun main() {}").unwrap();

    apkbuilder(dir.path()).arg("zip").assert().success();

    let bytes = fs::read(dir.path().join("outputs/project.zip")).unwrap();
    let has = |name: &str| bytes.windows(name.len()).any(|w| w == name.as_bytes());
    assert!(has("app/src/Main.kt"));
    assert!(!has("apkbuilder.toml"));
    assert!(!dir.path().join(".git").exists());
}

#[test]
fn test_remove_build_deletes_only_app_build() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), None);
    fs::create_dir_all(dir.path().join("app/build/intermediates")).unwrap();
    fs::write(dir.path().join("app/build.gradle"), "android {}").unwrap();

    apkbuilder(dir.path()).arg("remove-build").assert().success();
    assert!(!dir.path().join("app/build").exists());
    assert!(dir.path().join("app/build.gradle").exists());

    apkbuilder(dir.path())
        .arg("remove-build")
        .assert()
        .success()
        .stdout(predicate::str::contains("No app/build"));
}
