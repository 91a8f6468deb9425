//! Lifecycle operations behind the `acpkg` commands.
//!
//! # Lifecycle
//!
//! ```text
//! options builder ── Default::default()        (initialize)
//!        │
//!        ▼  finalize(self)                     (consumes the builder, runs once)
//! frozen options
//!        │
//!        ▼  run
//! acpkg test     ── ansible-playbook <args> run_tests.yml   (cwd: test/)
//! acpkg sdist    ── copy conductor files → container/docker/files/
//!                   git ls-files → dist/<name>-<version>.tar.gz
//! acpkg prebake  ── docker build, one conductor image per distro
//! ```
//!
//! Each operation talks to exactly one external collaborator. Subprocesses
//! go through [`acpkg_exec::ProcessExecutor`].

pub mod bundle;
pub mod playbook;
pub mod prebake;
pub mod sdist;

pub use bundle::{BundleError, bundle_conductor_files};
pub use playbook::{PlaybookError, PlaybookTests, TestOptions, TestOptionsBuilder};
pub use prebake::{
    EnginePrebaker, PrebakeError, PrebakeOptions, PrebakeOptionsBuilder, PrebakeSummary, Prebaker,
};
pub use sdist::{SdistError, SdistOptions, SdistOptionsBuilder, create_sdist};
