use std::process::ExitCode;

use clap::{ArgMatches, Command};

use super::Context;

pub(crate) const DESCRIBE: &str = "describe";

pub(crate) fn describe_command() -> Command {
    Command::new(DESCRIBE).about("Print the package configuration for the detected mode as JSON")
}

/// Print the package descriptor the packaging step consumes.
pub(crate) fn describe(_matches: &ArgMatches, ctx: &Context) -> anyhow::Result<ExitCode> {
    ctx.logging.apply();
    tracing::debug!(mode = %ctx.package.mode, "describing package configuration");

    let json = serde_json::to_string_pretty(&ctx.package)?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}
