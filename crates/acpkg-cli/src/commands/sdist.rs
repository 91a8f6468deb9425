use std::path::PathBuf;
use std::process::ExitCode;

use acpkg_build::{SdistOptions, SdistOptionsBuilder, bundle_conductor_files, create_sdist};
use async_trait::async_trait;
use clap::Args;

use super::Context;
use crate::registry::CommandSpec;

#[derive(Debug, Args)]
pub(crate) struct SdistArgs {
    /// Directory to write the archive into (default: [bundle].dist_dir)
    #[arg(long, value_name = "DIR")]
    dist_dir: Option<PathBuf>,
}

/// `acpkg sdist`: stage conductor files, then build the source archive.
pub(crate) struct SdistCommand;

#[async_trait]
impl CommandSpec for SdistCommand {
    const NAME: &'static str = "sdist";
    const ABOUT: &'static str = "Bundle conductor files and create a source distribution";

    type Args = SdistArgs;
    type Options = SdistOptions;

    fn finalize(args: SdistArgs, ctx: &Context) -> anyhow::Result<SdistOptions> {
        Ok(SdistOptionsBuilder::default()
            .dist_dir(args.dist_dir)
            .finalize(&ctx.config.bundle))
    }

    async fn run(&self, options: SdistOptions, ctx: &Context) -> anyhow::Result<ExitCode> {
        ctx.logging.apply();

        let staged = bundle_conductor_files(&ctx.project_dir, &ctx.config.bundle)?;
        let archive = create_sdist(
            &ctx.project_dir,
            &ctx.package.metadata.name,
            &ctx.package.metadata.version,
            &staged,
            &options,
        )?;

        println!("Created {}", archive.display());
        Ok(ExitCode::SUCCESS)
    }
}
