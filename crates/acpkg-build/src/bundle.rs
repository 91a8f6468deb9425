use std::path::{Path, PathBuf};

use acpkg_core::BundleConfig;

/// Copies the conductor support files into the staging directory.
///
/// The conductor image installs the package from these copies, so every
/// source must exist: all of them are checked before the first copy, and
/// a missing one leaves the staging directory untouched.
///
/// Files are staged by file name, so two sources sharing a name are
/// rejected in the same pass.
///
/// Returns the staged paths relative to `project_dir`, in configured order.
pub fn bundle_conductor_files(
    project_dir: &Path,
    config: &BundleConfig,
) -> Result<Vec<PathBuf>, BundleError> {
    let mut plan: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(config.files.len());

    for relative in &config.files {
        let src = project_dir.join(relative);
        match std::fs::metadata(&src) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(BundleError::NotAFile(src)),
            Err(e) => return Err(BundleError::MissingSource { path: src, source: e }),
        }

        let file_name = relative
            .file_name()
            .ok_or_else(|| BundleError::NotAFile(src.clone()))?;
        let dst_relative = config.staging.join(file_name);
        if let Some((first, _)) = plan.iter().find(|(_, dst)| *dst == dst_relative) {
            return Err(BundleError::DuplicateName {
                staged: dst_relative,
                first: first.clone(),
                second: src,
            });
        }
        plan.push((src, dst_relative));
    }

    let staging_dir = project_dir.join(&config.staging);
    std::fs::create_dir_all(&staging_dir).map_err(|e| BundleError::Create {
        path: staging_dir.clone(),
        source: e,
    })?;

    let mut staged = Vec::with_capacity(plan.len());
    for (src, dst_relative) in plan {
        let dst = project_dir.join(&dst_relative);
        std::fs::copy(&src, &dst).map_err(|e| BundleError::CopyFile {
            path: src.clone(),
            source: e,
        })?;
        tracing::debug!("staged {} -> {}", src.display(), dst.display());
        staged.push(dst_relative);
    }

    tracing::info!(
        staging = %staging_dir.display(),
        "bundled {} conductor file(s)",
        staged.len()
    );
    Ok(staged)
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("conductor file {path} is missing")]
    MissingSource {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("conductor file {0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("{first} and {second} would both be staged as {staged}")]
    DuplicateName {
        staged: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("failed to create directory {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to copy file {path}")]
    CopyFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
