//! Core types and configuration for acpkg.
//!
//! This crate defines the runtime [`Mode`] detection, the `acpkg.toml`
//! schema ([`AcpkgConfig`]), the requirements reader ([`RequirementsFile`]),
//! the mode-specific package descriptor ([`PackageConfiguration`]), and
//! shared error types.

pub mod config;
pub mod error;
pub mod marker;
pub mod mode;
pub mod package;
pub mod requirements;

pub use config::{AcpkgConfig, BundleConfig, CONFIG_FILE, PrebakeConfig, ProjectConfig, TestConfig};
pub use error::{Error, Result};
pub use marker::Platform;
pub use mode::{MODE_ENV_VAR, Mode};
pub use package::{CommandName, PackageConfiguration, PackageMetadata};
pub use requirements::{Requirement, RequirementsFile, RequirementsSource};
