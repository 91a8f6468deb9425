//! Named lifecycle actions and their dispatch.
//!
//! Each action declares its flags as a clap [`Args`] struct (the defaults
//! are its initial options), turns the parsed flags into frozen options in
//! `finalize`, and only then runs. `run` never sees unfinalized input.

use std::process::ExitCode;

use acpkg_core::{CommandName, PackageConfiguration};
use async_trait::async_trait;
use clap::{ArgMatches, Args, Command, FromArgMatches};

use crate::commands::{self, Context, PrebakeCommand, SdistCommand, TestCommand};

/// A lifecycle action with typed options.
#[async_trait]
pub(crate) trait CommandSpec: Send + Sync {
    const NAME: &'static str;
    const ABOUT: &'static str;

    /// Raw command-line flags.
    type Args: Args + Send;
    /// Fully derived options consumed by `run`.
    type Options: Send;

    fn finalize(args: Self::Args, ctx: &Context) -> anyhow::Result<Self::Options>;

    async fn run(&self, options: Self::Options, ctx: &Context) -> anyhow::Result<ExitCode>;
}

/// Object-safe view of a [`CommandSpec`], as stored in the [`Registry`].
#[async_trait]
pub(crate) trait LifecycleCommand: Send + Sync {
    fn name(&self) -> &'static str;

    /// The clap subcommand, with every option at its default.
    fn command(&self) -> Command;

    /// Finalize options from `matches`, then run.
    async fn execute(&self, matches: &ArgMatches, ctx: &Context) -> anyhow::Result<ExitCode>;
}

#[async_trait]
impl<T: CommandSpec> LifecycleCommand for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn command(&self) -> Command {
        T::Args::augment_args(Command::new(T::NAME).about(T::ABOUT))
    }

    async fn execute(&self, matches: &ArgMatches, ctx: &Context) -> anyhow::Result<ExitCode> {
        let args = T::Args::from_arg_matches(matches)?;
        let options = T::finalize(args, ctx)?;
        self.run(options, ctx).await
    }
}

/// Action name → handler, in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    commands: Vec<Box<dyn LifecycleCommand>>,
}

impl Registry {
    /// Register the handlers for every command `package` declares.
    pub(crate) fn for_package(package: &PackageConfiguration) -> Self {
        let mut registry = Self::default();
        for name in &package.commands {
            match name {
                CommandName::Test => registry.register(Box::new(TestCommand)),
                CommandName::Sdist => registry.register(Box::new(SdistCommand)),
                CommandName::Prebake => registry.register(Box::new(PrebakeCommand)),
            }
        }
        registry
    }

    /// Add a handler. A handler with the same name is replaced.
    pub(crate) fn register(&mut self, command: Box<dyn LifecycleCommand>) {
        match self.commands.iter().position(|c| c.name() == command.name()) {
            Some(idx) => self.commands[idx] = command,
            None => self.commands.push(command),
        }
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    fn get(&self, name: &str) -> Option<&dyn LifecycleCommand> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c)
    }

    /// The top-level `acpkg` command line.
    pub(crate) fn command(&self) -> Command {
        Command::new("acpkg")
            .about("Package, test, and pre-bake Ansible Container")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(commands::describe_command())
            .subcommands(self.commands.iter().map(|c| c.command()))
    }

    pub(crate) async fn dispatch(
        &self,
        matches: &ArgMatches,
        ctx: &Context,
    ) -> anyhow::Result<ExitCode> {
        match matches.subcommand() {
            Some((commands::DESCRIBE, sub)) => commands::describe(sub, ctx),
            Some((name, sub)) => match self.get(name) {
                Some(command) => command.execute(sub, ctx).await,
                None => anyhow::bail!("unknown command `{name}`"),
            },
            None => anyhow::bail!("no command given; see `acpkg --help`"),
        }
    }
}
