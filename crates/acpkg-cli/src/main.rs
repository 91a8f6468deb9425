mod commands;
mod logging;
mod registry;

use std::path::PathBuf;
use std::process::ExitCode;

use acpkg_core::{
    AcpkgConfig, Mode, PackageConfiguration, PackageMetadata, Platform, RequirementsFile,
};

use crate::commands::Context;
use crate::logging::LoggingConfig;
use crate::registry::Registry;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mode = Mode::detect()?;

    let project_dir = PathBuf::from(".");
    let config = AcpkgConfig::load(&project_dir)?;

    let requirements = RequirementsFile::new(
        project_dir.join(&config.project.requirements),
        Platform::current(),
    );
    let metadata = PackageMetadata::new(&config.project.name, &config.project.version);
    let package = PackageConfiguration::build(mode, metadata, &requirements)?;

    let registry = Registry::for_package(&package);
    let matches = registry.command().get_matches();

    let ctx = Context {
        project_dir,
        config,
        package,
        logging: LoggingConfig::default(),
    };
    registry.dispatch(&matches, &ctx).await
}
