use std::path::Path;
use std::process::Command;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const MODE_VAR: &str = "ANSIBLE_CONTAINER_ENV";

fn acpkg() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("acpkg");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn host(dir: &Path) -> assert_cmd::Command {
    let mut cmd = acpkg();
    cmd.current_dir(dir).env(MODE_VAR, "host");
    cmd
}

fn conductor(dir: &Path) -> assert_cmd::Command {
    let mut cmd = acpkg();
    cmd.current_dir(dir).env(MODE_VAR, "conductor");
    cmd
}

/// A host project with a requirements file and an empty test directory.
fn host_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("requirements.txt"),
        "# runtime\nPyYAML>=3.12\nrequests>=2.0\npywin32 ; sys_platform == 'win32'\n",
    )
    .unwrap();
    std::fs::create_dir(tmp.path().join("test")).unwrap();
    tmp
}

fn write_config(dir: &Path, toml: &str) {
    std::fs::write(dir.join("acpkg.toml"), toml).unwrap();
}

// ── Help / Version ──

#[test]
fn shows_help() {
    host(host_project().path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Package, test, and pre-bake"))
        .stdout(predicate::str::contains("prebake"));
}

#[test]
fn shows_version() {
    conductor(TempDir::new().unwrap().path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("acpkg"));
}

// ── Mode ──

#[test]
fn missing_mode_fails_and_names_the_variable() {
    let tmp = TempDir::new().unwrap();

    acpkg()
        .current_dir(tmp.path())
        .env_remove(MODE_VAR)
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains(MODE_VAR));
}

#[test]
fn unrecognized_mode_fails() {
    let tmp = TempDir::new().unwrap();

    acpkg()
        .current_dir(tmp.path())
        .env(MODE_VAR, "sandbox")
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sandbox"));
}

#[test]
fn mode_is_case_insensitive() {
    let tmp = TempDir::new().unwrap();

    acpkg()
        .current_dir(tmp.path())
        .env(MODE_VAR, " Conductor ")
        .arg("describe")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"conductor\""));
}

// ── Describe ──

#[test]
fn conductor_describe_needs_no_requirements_file() {
    let tmp = TempDir::new().unwrap();

    conductor(tmp.path())
        .arg("describe")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "container.cli:conductor_commandline",
        ))
        .stdout(predicate::str::contains("\"install_requires\": []"))
        .stdout(predicate::str::contains("\"commands\": []"));
}

#[test]
fn host_describe_lists_requirements_and_commands() {
    let tmp = host_project();

    let output = host(tmp.path()).arg("describe").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mode"], "host");
    assert_eq!(
        json["install_requires"],
        serde_json::json!(["PyYAML>=3.12", "requests>=2.0"])
    );
    assert_eq!(
        json["commands"],
        serde_json::json!(["test", "sdist", "prebake"])
    );
    assert!(json["extras_require"]["docker"].is_array());
    assert_eq!(json["extras_require"]["k8s"], json["extras_require"]["openshift"]);
}

#[test]
fn host_describe_without_requirements_fails() {
    let tmp = TempDir::new().unwrap();

    host(tmp.path())
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requirements.txt"));
}

#[test]
fn describe_output_is_stable() {
    let tmp = host_project();

    let first = host(tmp.path()).arg("describe").output().unwrap();
    let second = host(tmp.path()).arg("describe").output().unwrap();

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

// ── Registry ──

#[test]
fn conductor_rejects_lifecycle_commands() {
    let tmp = TempDir::new().unwrap();

    for command in ["test", "sdist", "prebake"] {
        conductor(tmp.path()).arg(command).assert().failure();
    }
}

// ── Test Command ──

#[test]
fn test_exits_with_runner_code() {
    let tmp = host_project();
    write_config(tmp.path(), "[test]\nrunner = \"sh\"\n");

    host(tmp.path())
        .args(["test", "--ansible-args", "-c 'exit 3'"])
        .assert()
        .code(3);
}

#[test]
fn test_runs_in_test_directory() {
    let tmp = host_project();
    write_config(tmp.path(), "[test]\nrunner = \"sh\"\n");

    host(tmp.path())
        .args(["test", "--ansible-args", "-c pwd"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("/test\n"));
}

#[test]
fn test_without_test_directory_fails() {
    let tmp = host_project();
    std::fs::remove_dir(tmp.path().join("test")).unwrap();
    write_config(tmp.path(), "[test]\nrunner = \"sh\"\n");

    host(tmp.path())
        .arg("test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("test"));
}

#[test]
fn test_rejects_unbalanced_quotes() {
    let tmp = host_project();
    write_config(tmp.path(), "[test]\nrunner = \"sh\"\n");

    host(tmp.path())
        .args(["test", "--ansible-args", "-c 'exit 3"])
        .assert()
        .failure();
}

// ── Sdist Command ──

fn init_git(dir: &Path) {
    for args in [
        vec!["init"],
        vec!["config", "user.email", "test@test.com"],
        vec!["config", "user.name", "Test"],
        vec!["add", "."],
        vec!["commit", "-m", "init"],
    ] {
        Command::new("git")
            .args(&args)
            .current_dir(dir)
            .output()
            .unwrap();
    }
}

fn write_conductor_sources(dir: &Path) {
    std::fs::write(dir.join("setup.py"), "from setuptools import setup\n").unwrap();
    std::fs::write(dir.join("conductor-requirements.txt"), "ansible\n").unwrap();
    std::fs::write(dir.join("conductor-requirements.yml"), "[]\n").unwrap();
}

fn archive_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().display().to_string())
        .collect()
}

#[test]
fn sdist_bundles_conductor_files_into_archive() {
    let tmp = host_project();
    write_conductor_sources(tmp.path());
    write_config(tmp.path(), "[project]\nversion = \"1.2.3\"\n");
    init_git(tmp.path());

    host(tmp.path())
        .arg("sdist")
        .assert()
        .success()
        .stdout(predicate::str::contains("ansible-container-1.2.3.tar.gz"));

    let archive = tmp.path().join("dist/ansible-container-1.2.3.tar.gz");
    let names = archive_names(&archive);
    assert!(names.contains(&"ansible-container-1.2.3/container/docker/files/setup.py".to_owned()));
    assert!(names.contains(&"ansible-container-1.2.3/requirements.txt".to_owned()));
}

#[test]
fn sdist_honors_dist_dir_flag() {
    let tmp = host_project();
    write_conductor_sources(tmp.path());
    init_git(tmp.path());

    host(tmp.path())
        .args(["sdist", "--dist-dir", "out"])
        .assert()
        .success();

    let produced = std::fs::read_dir(tmp.path().join("out")).unwrap().count();
    assert_eq!(produced, 1);
}

#[test]
fn sdist_missing_conductor_file_stages_nothing() {
    let tmp = host_project();
    write_conductor_sources(tmp.path());
    std::fs::remove_file(tmp.path().join("conductor-requirements.txt")).unwrap();
    init_git(tmp.path());

    host(tmp.path())
        .arg("sdist")
        .assert()
        .failure()
        .stderr(predicate::str::contains("conductor-requirements.txt"));

    assert!(!tmp.path().join("container/docker/files").exists());
    assert!(!tmp.path().join("dist").exists());
}

// ── Prebake Command ──

#[cfg(unix)]
fn fake_engine(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-engine");
    std::fs::write(
        &path,
        "#!/bin/sh\nif [ \"$1\" = version ]; then echo 24.0.7; exit 0; fi\nexit 0\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn prebake_builds_requested_distros() {
    let tmp = host_project();
    let engine = fake_engine(tmp.path());
    write_config(
        tmp.path(),
        &format!("[prebake]\nengine = {:?}\n", engine.display().to_string()),
    );

    host(tmp.path())
        .args(["prebake", "--distros", "centos:7, alpine:3.6,"])
        .assert()
        .success()
        .stdout(predicate::str::contains("container-conductor-centos-7:"))
        .stdout(predicate::str::contains("container-conductor-alpine-3.6:"))
        .stdout(predicate::str::contains("ubuntu").not());
}

#[cfg(unix)]
#[test]
fn prebake_debug_raises_log_level() {
    let tmp = host_project();
    let engine = fake_engine(tmp.path());
    write_config(
        tmp.path(),
        &format!("[prebake]\nengine = {:?}\n", engine.display().to_string()),
    );

    host(tmp.path())
        .args(["prebake", "--distros", "centos:7"])
        .assert()
        .success()
        .stderr(predicate::str::contains("engine available").not());

    host(tmp.path())
        .args(["prebake", "--debug", "--distros", "centos:7"])
        .assert()
        .success()
        .stderr(predicate::str::contains("engine available"));
}

#[test]
fn prebake_unsupported_distro_fails() {
    let tmp = host_project();

    host(tmp.path())
        .args(["prebake", "--distros", "gentoo:latest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gentoo:latest"));
}
