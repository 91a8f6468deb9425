//! Subprocess execution for acpkg.
//!
//! Every external collaborator (playbook runner, container engine) is
//! reached through [`ProcessExecutor`], so lifecycle commands can be tested
//! against a mock without spawning anything.

pub mod error;
pub mod executor;
pub mod invocation;

pub use error::ExecError;
pub use executor::{ProcessExecutor, RealExecutor};
pub use invocation::Invocation;
