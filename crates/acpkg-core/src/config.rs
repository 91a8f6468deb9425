use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the per-project configuration file.
pub const CONFIG_FILE: &str = "acpkg.toml";

/// acpkg.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcpkgConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub test: TestConfig,
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub prebake: PrebakeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Distribution name
    #[serde(default = "default_name")]
    pub name: String,
    /// Distribution version (defaults to the acpkg version)
    #[serde(default = "default_version")]
    pub version: String,
    /// Host-mode install requirements, relative to the project root
    #[serde(default = "default_requirements")]
    pub requirements: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Playbook runner binary
    #[serde(default = "default_runner")]
    pub runner: String,
    /// Playbook passed as the last runner argument
    #[serde(default = "default_playbook")]
    pub playbook: String,
    /// Working directory of the runner, relative to the project root
    #[serde(default = "default_test_dir")]
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Staging directory the conductor files are copied into
    #[serde(default = "default_staging")]
    pub staging: PathBuf,
    /// Files copied from the project root into `staging`
    #[serde(default = "default_bundle_files")]
    pub files: Vec<PathBuf>,
    /// Output directory for source archives
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrebakeConfig {
    /// Container engine CLI
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Conductor image name prefix
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,
    /// Build context, relative to the project root
    #[serde(default = "default_context")]
    pub context: PathBuf,
    /// Conductor Dockerfile, relative to the project root
    #[serde(default = "default_dockerfile")]
    pub dockerfile: PathBuf,
    /// Distros prebaked when none are requested
    #[serde(default = "default_supported_distros")]
    pub supported_distros: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            requirements: default_requirements(),
        }
    }
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            runner: default_runner(),
            playbook: default_playbook(),
            directory: default_test_dir(),
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            staging: default_staging(),
            files: default_bundle_files(),
            dist_dir: default_dist_dir(),
        }
    }
}

impl Default for PrebakeConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            image_prefix: default_image_prefix(),
            context: default_context(),
            dockerfile: default_dockerfile(),
            supported_distros: default_supported_distros(),
        }
    }
}

impl AcpkgConfig {
    /// Load from acpkg.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path,
                source: e,
            })
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

fn default_name() -> String {
    "ansible-container".to_owned()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}

fn default_requirements() -> PathBuf {
    PathBuf::from("requirements.txt")
}

fn default_runner() -> String {
    "ansible-playbook".to_owned()
}

fn default_playbook() -> String {
    "run_tests.yml".to_owned()
}

fn default_test_dir() -> PathBuf {
    PathBuf::from("test")
}

fn default_staging() -> PathBuf {
    PathBuf::from("container/docker/files")
}

fn default_bundle_files() -> Vec<PathBuf> {
    ["setup.py", "conductor-requirements.txt", "conductor-requirements.yml"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_engine() -> String {
    "docker".to_owned()
}

fn default_image_prefix() -> String {
    "container-conductor".to_owned()
}

fn default_context() -> PathBuf {
    PathBuf::from("container/docker")
}

fn default_dockerfile() -> PathBuf {
    PathBuf::from("container/docker/templates/conductor-dockerfile")
}

fn default_supported_distros() -> Vec<String> {
    [
        "centos:7",
        "fedora:26",
        "fedora:25",
        "amazonlinux:2",
        "ubuntu:precise",
        "ubuntu:trusty",
        "ubuntu:xenial",
        "ubuntu:zesty",
        "debian:jessie",
        "debian:stretch",
        "debian:wheezy",
        "alpine:3.5",
        "alpine:3.6",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}
