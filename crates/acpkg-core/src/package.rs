//! Mode-specific package descriptor.
//!
//! The host build ships the full `ansible-container` command line with its
//! install requirements, extras, and lifecycle commands. The conductor build
//! ships only the `conductor` entry point; its dependencies are already
//! baked into the conductor image.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::mode::Mode;
use crate::requirements::RequirementsSource;

/// Test-only dependencies for the host build.
const TESTS_REQUIRE: &[&str] = &[
    "ansible>=2.3.0",
    "pytest>=3",
    "docker>=2.4.0,<3.0",
    "jmespath>=0.9",
];

const DOCKER_SPEC: &str = "docker>=2.4.0,<3.0";
const SPHINX_SPEC: &str = "Sphinx>=1.5.0";
const OPENSHIFT_SPEC: &str = "openshift==0.3.4";

/// Lifecycle commands a package can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandName {
    Test,
    Sdist,
    Prebake,
}

impl CommandName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Sdist => "sdist",
            Self::Prebake => "prebake",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution metadata shared by both modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub url: String,
    pub license: String,
    pub author: String,
    pub author_email: String,
    pub description: String,
    /// Package discovery pattern
    pub packages: String,
    pub include_package_data: bool,
    pub zip_safe: bool,
}

impl PackageMetadata {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_owned(),
            version: version.to_owned(),
            url: "https://github.com/ansible/ansible-container".to_owned(),
            license: "LGPLv3 (See LICENSE file for terms)".to_owned(),
            author: "Joshua \"jag\" Ginsberg, Chris Houseknecht, and others \
                     (See AUTHORS file for contributors)"
                .to_owned(),
            author_email: "jag@ansible.com".to_owned(),
            description: "Ansible Container empowers you to orchestrate, build, run, and ship \
                          Docker images built from Ansible playbooks."
                .to_owned(),
            packages: "container.*".to_owned(),
            include_package_data: true,
            zip_safe: false,
        }
    }
}

/// The installable-package descriptor for one [`Mode`].
///
/// Built once, never mutated. Maps are ordered so that equal inputs
/// serialize byte-for-byte identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageConfiguration {
    pub mode: Mode,
    pub metadata: PackageMetadata,
    pub install_requires: Vec<String>,
    pub extras_require: BTreeMap<String, Vec<String>>,
    pub tests_require: Vec<String>,
    pub console_scripts: BTreeMap<String, String>,
    pub commands: Vec<CommandName>,
}

impl PackageConfiguration {
    /// Select the configuration for `mode`.
    ///
    /// `requirements` is only read for [`Mode::Host`]; entries whose marker
    /// does not match the current platform are left out.
    pub fn build(
        mode: Mode,
        metadata: PackageMetadata,
        requirements: &dyn RequirementsSource,
    ) -> crate::Result<Self> {
        match mode {
            Mode::Host => {
                let install_requires = requirements
                    .read()?
                    .into_iter()
                    .filter(|req| {
                        if !req.matches_platform {
                            tracing::debug!(
                                specifier = %req.specifier,
                                marker = req.marker.as_deref().unwrap_or(""),
                                "requirement excluded by environment marker"
                            );
                        }
                        req.matches_platform
                    })
                    .map(|req| req.specifier)
                    .collect();

                Ok(Self {
                    mode,
                    metadata,
                    install_requires,
                    extras_require: host_extras(),
                    tests_require: owned(TESTS_REQUIRE),
                    console_scripts: BTreeMap::from([(
                        "ansible-container".to_owned(),
                        "container.cli:host_commandline".to_owned(),
                    )]),
                    commands: vec![CommandName::Test, CommandName::Sdist, CommandName::Prebake],
                })
            }
            Mode::Conductor => Ok(Self {
                mode,
                metadata,
                install_requires: Vec::new(),
                extras_require: BTreeMap::new(),
                tests_require: Vec::new(),
                console_scripts: BTreeMap::from([(
                    "conductor".to_owned(),
                    "container.cli:conductor_commandline".to_owned(),
                )]),
                commands: Vec::new(),
            }),
        }
    }

    /// Whether this configuration declares the given lifecycle command.
    pub fn declares(&self, command: CommandName) -> bool {
        self.commands.contains(&command)
    }
}

// `k8s` is an alias of `openshift`; both names are published.
fn host_extras() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        ("docker".to_owned(), owned(&[DOCKER_SPEC])),
        ("docbuild".to_owned(), owned(&[SPHINX_SPEC])),
        ("openshift".to_owned(), owned(&[OPENSHIFT_SPEC])),
        ("k8s".to_owned(), owned(&[OPENSHIFT_SPEC])),
    ])
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
