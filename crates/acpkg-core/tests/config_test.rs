use std::path::PathBuf;

use acpkg_core::AcpkgConfig;
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = AcpkgConfig::load(tmp.path()).unwrap();

    assert_eq!(config.project.name, "ansible-container");
    assert_eq!(config.project.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(config.project.requirements, PathBuf::from("requirements.txt"));
    assert_eq!(config.test.runner, "ansible-playbook");
    assert_eq!(config.test.playbook, "run_tests.yml");
    assert_eq!(config.test.directory, PathBuf::from("test"));
    assert_eq!(config.bundle.staging, PathBuf::from("container/docker/files"));
    assert_eq!(
        config.bundle.files,
        vec![
            PathBuf::from("setup.py"),
            PathBuf::from("conductor-requirements.txt"),
            PathBuf::from("conductor-requirements.yml"),
        ]
    );
    assert_eq!(config.bundle.dist_dir, PathBuf::from("dist"));
    assert_eq!(config.prebake.engine, "docker");
    assert_eq!(config.prebake.image_prefix, "container-conductor");
    assert_eq!(config.prebake.supported_distros.len(), 13);
    assert_eq!(config.prebake.supported_distros[0], "centos:7");
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[project]
name = "my-container"
version = "1.2.3"
requirements = "reqs/host.txt"

[test]
runner = "/usr/local/bin/ansible-playbook"
playbook = "smoke.yml"
directory = "integration"

[bundle]
staging = "out/files"
files = ["setup.py"]
dist_dir = "build/dist"

[prebake]
engine = "podman"
image_prefix = "my-conductor"
context = "images"
dockerfile = "images/Dockerfile"
supported_distros = ["centos:7", "alpine:3.6"]
"#;
    std::fs::write(tmp.path().join("acpkg.toml"), toml).unwrap();

    let config = AcpkgConfig::load(tmp.path()).unwrap();

    assert_eq!(config.project.name, "my-container");
    assert_eq!(config.project.version, "1.2.3");
    assert_eq!(config.project.requirements, PathBuf::from("reqs/host.txt"));
    assert_eq!(config.test.runner, "/usr/local/bin/ansible-playbook");
    assert_eq!(config.test.playbook, "smoke.yml");
    assert_eq!(config.test.directory, PathBuf::from("integration"));
    assert_eq!(config.bundle.staging, PathBuf::from("out/files"));
    assert_eq!(config.bundle.files, vec![PathBuf::from("setup.py")]);
    assert_eq!(config.bundle.dist_dir, PathBuf::from("build/dist"));
    assert_eq!(config.prebake.engine, "podman");
    assert_eq!(config.prebake.image_prefix, "my-conductor");
    assert_eq!(config.prebake.context, PathBuf::from("images"));
    assert_eq!(config.prebake.dockerfile, PathBuf::from("images/Dockerfile"));
    assert_eq!(config.prebake.supported_distros, vec!["centos:7", "alpine:3.6"]);
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[test]
playbook = "other.yml"
"#;
    std::fs::write(tmp.path().join("acpkg.toml"), toml).unwrap();

    let config = AcpkgConfig::load(tmp.path()).unwrap();

    assert_eq!(config.test.playbook, "other.yml");
    // Defaults preserved
    assert_eq!(config.test.runner, "ansible-playbook");
    assert_eq!(config.project.name, "ansible-container");
    assert_eq!(config.prebake.engine, "docker");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("acpkg.toml"), "not valid {{{{ toml").unwrap();

    let result = AcpkgConfig::load(tmp.path());
    assert!(matches!(result, Err(acpkg_core::Error::ConfigParse { .. })));

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("acpkg.toml"), "").unwrap();

    let config = AcpkgConfig::load(tmp.path()).unwrap();
    assert_eq!(config.project.name, "ansible-container");
}
