//! Pre-baking conductor base images.
//!
//! One conductor image is built per distro through the container engine
//! CLI. With `ignore_errors`, a failing distro is logged and skipped;
//! otherwise the first failure stops the run.

use std::path::{Path, PathBuf};

use acpkg_core::PrebakeConfig;
use acpkg_exec::{ExecError, Invocation, ProcessExecutor, RealExecutor};

/// Raw `prebake` options as supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct PrebakeOptionsBuilder {
    debug: bool,
    no_cache: bool,
    ignore_errors: bool,
    distros: String,
}

impl PrebakeOptionsBuilder {
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    /// Comma-separated distro list; empty means every supported distro.
    pub fn distros(mut self, distros: impl Into<String>) -> Self {
        self.distros = distros.into();
        self
    }

    pub fn finalize(self) -> PrebakeOptions {
        PrebakeOptions {
            debug: self.debug,
            cache_enabled: !self.no_cache,
            ignore_errors: self.ignore_errors,
            distros: parse_distros(&self.distros),
        }
    }
}

/// Finalized `prebake` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrebakeOptions {
    pub debug: bool,
    pub cache_enabled: bool,
    /// Per-distro failure tolerance inside the build loop
    pub ignore_errors: bool,
    /// Requested distros; empty means all supported
    pub distros: Vec<String>,
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_distros(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Outcome of a prebake run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrebakeSummary {
    /// Image tags that were built
    pub built: Vec<String>,
    /// Distros that failed (only populated with `ignore_errors`)
    pub failed: Vec<String>,
}

/// The multi-target image build routine.
#[allow(async_fn_in_trait)]
pub trait Prebaker {
    async fn prebake(&self, options: &PrebakeOptions) -> Result<PrebakeSummary, PrebakeError>;
}

/// Builds conductor images with the configured container engine.
pub struct EnginePrebaker<'a, E: ProcessExecutor = RealExecutor> {
    executor: E,
    config: &'a PrebakeConfig,
    project_dir: PathBuf,
    version: String,
}

impl<'a> EnginePrebaker<'a, RealExecutor> {
    pub fn new(config: &'a PrebakeConfig, project_dir: &Path, version: &str) -> Self {
        Self::with_executor(RealExecutor, config, project_dir, version)
    }
}

impl<'a, E: ProcessExecutor> EnginePrebaker<'a, E> {
    pub fn with_executor(
        executor: E,
        config: &'a PrebakeConfig,
        project_dir: &Path,
        version: &str,
    ) -> Self {
        Self {
            executor,
            config,
            project_dir: project_dir.to_path_buf(),
            version: version.to_owned(),
        }
    }

    /// Conductor image tag for `distro`, e.g. `container-conductor-centos-7:0.9.3`.
    pub fn image_tag(&self, distro: &str) -> String {
        format!(
            "{}-{}:{}",
            self.config.image_prefix,
            distro.replace(':', "-"),
            self.version
        )
    }

    /// The engine build call for one distro.
    pub fn build_invocation(&self, distro: &str, options: &PrebakeOptions) -> Invocation {
        let mut invocation = Invocation::new(&self.config.engine)
            .arg("build")
            .args(["--tag".to_owned(), self.image_tag(distro)])
            .args(["--build-arg".to_owned(), format!("CONDUCTOR_BASE={distro}")])
            .args([
                "--file".to_owned(),
                self.project_dir
                    .join(&self.config.dockerfile)
                    .display()
                    .to_string(),
            ]);
        if !options.cache_enabled {
            invocation = invocation.arg("--no-cache");
        }
        if options.debug {
            invocation = invocation.arg("--progress=plain");
        }
        invocation
            .arg(self.project_dir.join(&self.config.context).display().to_string())
            .current_dir(&self.project_dir)
    }

    fn resolve_distros(&self, requested: &[String]) -> Result<Vec<String>, PrebakeError> {
        if requested.is_empty() {
            return Ok(self.config.supported_distros.clone());
        }
        for distro in requested {
            if !self.config.supported_distros.contains(distro) {
                return Err(PrebakeError::UnsupportedDistro {
                    distro: distro.clone(),
                    supported: self.config.supported_distros.clone(),
                });
            }
        }
        Ok(requested.to_vec())
    }

    async fn check_engine(&self) -> Result<(), PrebakeError> {
        let version = self
            .executor
            .output(
                &Invocation::new(&self.config.engine)
                    .args(["version", "--format", "{{.Server.Version}}"]),
            )
            .await
            .map_err(|e| PrebakeError::EngineUnavailable {
                engine: self.config.engine.clone(),
                source: e,
            })?;
        tracing::debug!(engine = %self.config.engine, version = version.trim(), "engine available");
        Ok(())
    }
}

impl<E: ProcessExecutor> Prebaker for EnginePrebaker<'_, E> {
    async fn prebake(&self, options: &PrebakeOptions) -> Result<PrebakeSummary, PrebakeError> {
        let distros = self.resolve_distros(&options.distros)?;
        self.check_engine().await?;

        let mut summary = PrebakeSummary::default();
        for distro in &distros {
            let tag = self.image_tag(distro);
            tracing::info!(distro = %distro, image = %tag, "prebaking conductor image");

            let invocation = self.build_invocation(distro, options);
            let failure = match self.executor.status(&invocation).await {
                Ok(0) => None,
                Ok(code) => Some(PrebakeError::BuildFailed {
                    distro: distro.clone(),
                    image: tag.clone(),
                    code,
                }),
                Err(e) => Some(PrebakeError::Engine {
                    distro: distro.clone(),
                    source: e,
                }),
            };

            match failure {
                None => summary.built.push(tag),
                Some(err) if options.ignore_errors => {
                    tracing::error!(distro = %distro, "prebake failed, continuing: {err}");
                    summary.failed.push(distro.clone());
                }
                Some(err) => return Err(err),
            }
        }

        tracing::info!(
            built = summary.built.len(),
            failed = summary.failed.len(),
            "prebake finished"
        );
        Ok(summary)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PrebakeError {
    #[error("distro {distro:?} is not supported; choose from: {}", supported.join(", "))]
    UnsupportedDistro {
        distro: String,
        supported: Vec<String>,
    },
    #[error("container engine {engine} is not available")]
    EngineUnavailable { engine: String, source: ExecError },
    #[error("building {image} for {distro} failed with exit code {code}")]
    BuildFailed {
        distro: String,
        image: String,
        code: i32,
    },
    #[error("container engine failed while building {distro}")]
    Engine { distro: String, source: ExecError },
}
