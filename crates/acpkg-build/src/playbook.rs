//! Integration tests run as an Ansible playbook.

use std::path::{Path, PathBuf};

use acpkg_core::TestConfig;
use acpkg_exec::{ExecError, Invocation, ProcessExecutor, RealExecutor};

/// Raw `test` options as supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct TestOptionsBuilder {
    ansible_args: String,
}

impl TestOptionsBuilder {
    /// Extra runner arguments, split with shell rules at finalize.
    pub fn ansible_args(mut self, args: impl Into<String>) -> Self {
        self.ansible_args = args.into();
        self
    }

    pub fn finalize(self) -> Result<TestOptions, PlaybookError> {
        let args = shlex::split(&self.ansible_args).ok_or_else(|| PlaybookError::InvalidArgs {
            raw: self.ansible_args.clone(),
        })?;
        Ok(TestOptions { args })
    }
}

/// Finalized `test` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOptions {
    args: Vec<String>,
}

impl TestOptions {
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Runs `<runner> <args> <playbook>` inside the project's test directory.
pub struct PlaybookTests<'a, E: ProcessExecutor = RealExecutor> {
    executor: E,
    config: &'a TestConfig,
    project_dir: PathBuf,
    target_os: &'a str,
}

impl<'a> PlaybookTests<'a, RealExecutor> {
    pub fn new(config: &'a TestConfig, project_dir: &Path) -> Self {
        Self::with_executor(RealExecutor, config, project_dir)
    }
}

impl<'a, E: ProcessExecutor> PlaybookTests<'a, E> {
    pub fn with_executor(executor: E, config: &'a TestConfig, project_dir: &Path) -> Self {
        Self {
            executor,
            config,
            project_dir: project_dir.to_path_buf(),
            target_os: std::env::consts::OS,
        }
    }

    /// Override the platform used for the `TMPDIR` adjustment.
    pub fn for_target_os(mut self, target_os: &'a str) -> Self {
        self.target_os = target_os;
        self
    }

    pub fn test_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.directory)
    }

    /// The runner call for `options`, without executing it.
    pub fn invocation(&self, options: &TestOptions) -> Invocation {
        let mut invocation = Invocation::new(&self.config.runner)
            .args(options.args().iter().cloned())
            .arg(&self.config.playbook)
            .current_dir(self.test_dir());

        // Docker for Mac only shares some host paths with its VM; /tmp is
        // one of them, the default temp dir is not.
        if let Some(tmpdir) = tmpdir_override(self.target_os) {
            invocation = invocation.env("TMPDIR", tmpdir);
        }

        invocation
    }

    /// Run the playbook and return its exit code unchanged.
    pub async fn run(&self, options: &TestOptions) -> Result<i32, PlaybookError> {
        let test_dir = self.test_dir();
        if !test_dir.is_dir() {
            return Err(PlaybookError::MissingTestDir(test_dir));
        }

        let invocation = self.invocation(options);
        tracing::info!(cwd = %test_dir.display(), "running {invocation}");

        let code = self
            .executor
            .status(&invocation)
            .await
            .map_err(|e| PlaybookError::Runner {
                runner: self.config.runner.clone(),
                source: e,
            })?;

        if code == 0 {
            tracing::info!("playbook tests passed");
        } else {
            tracing::warn!(code, "playbook tests failed");
        }
        Ok(code)
    }
}

/// `TMPDIR` value forced on the runner for `target_os`, if any.
pub fn tmpdir_override(target_os: &str) -> Option<&'static str> {
    (target_os == "macos").then_some("/tmp")
}

#[derive(Debug, thiserror::Error)]
pub enum PlaybookError {
    #[error("cannot split runner arguments {raw:?}: unbalanced quotes or trailing escape")]
    InvalidArgs { raw: String },
    #[error("test directory {0} does not exist")]
    MissingTestDir(PathBuf),
    #[error("failed to run {runner}")]
    Runner { runner: String, source: ExecError },
}
