use std::process::ExitCode;

use acpkg_build::{EnginePrebaker, PrebakeOptions, PrebakeOptionsBuilder, Prebaker};
use async_trait::async_trait;
use clap::Args;
use tracing::Level;

use super::Context;
use crate::logging::CHANNEL;
use crate::registry::CommandSpec;

#[derive(Debug, Args)]
pub(crate) struct PrebakeArgs {
    /// Enable debug output
    #[arg(long)]
    debug: bool,
    /// Build without the engine's layer cache
    #[arg(long)]
    no_cache: bool,
    /// Ignore build failures and continue building other distros
    #[arg(long)]
    ignore_errors: bool,
    /// Only pre-bake certain supported distros. Comma-separated.
    #[arg(long, value_name = "LIST", default_value = "")]
    distros: String,
}

/// `acpkg prebake`: build conductor base images ahead of time.
pub(crate) struct PrebakeCommand;

#[async_trait]
impl CommandSpec for PrebakeCommand {
    const NAME: &'static str = "prebake";
    const ABOUT: &'static str = "Pre-bake Conductor base images";

    type Args = PrebakeArgs;
    type Options = PrebakeOptions;

    fn finalize(args: PrebakeArgs, _ctx: &Context) -> anyhow::Result<PrebakeOptions> {
        Ok(PrebakeOptionsBuilder::default()
            .debug(args.debug)
            .no_cache(args.no_cache)
            .ignore_errors(args.ignore_errors)
            .distros(args.distros)
            .finalize())
    }

    async fn run(&self, options: PrebakeOptions, ctx: &Context) -> anyhow::Result<ExitCode> {
        let logging = if options.debug {
            ctx.logging.clone().with_channel(CHANNEL, Level::TRACE)
        } else {
            ctx.logging.clone()
        };
        logging.apply();

        let prebaker = EnginePrebaker::new(
            &ctx.config.prebake,
            &ctx.project_dir,
            &ctx.package.metadata.version,
        );
        let summary = prebaker.prebake(&options).await?;

        for image in &summary.built {
            println!("Built {image}");
        }
        for distro in &summary.failed {
            println!("Failed {distro} (ignored)");
        }
        Ok(ExitCode::SUCCESS)
    }
}
