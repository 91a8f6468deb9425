mod describe;
mod prebake;
mod sdist;

use std::path::PathBuf;
use std::process::ExitCode;

use acpkg_core::{AcpkgConfig, PackageConfiguration};

use crate::logging::LoggingConfig;

pub(crate) use describe::{DESCRIBE, describe, describe_command};
pub(crate) use prebake::PrebakeCommand;
pub(crate) use sdist::SdistCommand;
pub(crate) use test::TestCommand;

/// Everything resolved before a command runs.
#[derive(Debug)]
pub(crate) struct Context {
    pub project_dir: PathBuf,
    pub config: AcpkgConfig,
    pub package: PackageConfiguration,
    pub logging: LoggingConfig,
}

/// Convert a child exit code into this process's exit code.
///
/// Codes outside `0..=255` cannot be reported verbatim and become `1`.
pub(crate) fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::warn!(code, "exit code not representable ({e}); reporting failure");
            ExitCode::FAILURE
        }
    }
}
