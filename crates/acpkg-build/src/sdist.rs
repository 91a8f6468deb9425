//! Source distribution archive (`<name>-<version>.tar.gz`).
//!
//! The file list mirrors the git working tree: tracked files plus untracked
//! files that are not ignored.
//! Conductor files staged by [`crate::bundle`] are always included, even
//! when `.gitignore` hides them.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use acpkg_core::BundleConfig;
use flate2::Compression;
use flate2::write::GzEncoder;

/// Paths never packed into an archive.
const ALWAYS_EXCLUDED: &[&str] = &[".git", "target"];

/// Raw `sdist` options as supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct SdistOptionsBuilder {
    dist_dir: Option<PathBuf>,
}

impl SdistOptionsBuilder {
    pub fn dist_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dist_dir = dir;
        self
    }

    pub fn finalize(self, config: &BundleConfig) -> SdistOptions {
        SdistOptions {
            dist_dir: self.dist_dir.unwrap_or_else(|| config.dist_dir.clone()),
        }
    }
}

/// Finalized `sdist` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdistOptions {
    /// Output directory; relative paths are resolved against the project root.
    pub dist_dir: PathBuf,
}

/// Writes `<dist_dir>/<name>-<version>.tar.gz` with every entry under
/// `<name>-<version>/`.
///
/// The archive is written under a `.partial` name and renamed into place
/// once complete.
pub fn create_sdist(
    project_dir: &Path,
    name: &str,
    version: &str,
    staged: &[PathBuf],
    options: &SdistOptions,
) -> Result<PathBuf, SdistError> {
    let dist_dir = project_dir.join(&options.dist_dir);
    let base = format!("{name}-{version}");

    std::fs::create_dir_all(&dist_dir).map_err(|e| SdistError::Create {
        path: dist_dir.clone(),
        source: e,
    })?;
    let dist_in_project = dist_dir_in_project(project_dir, &dist_dir)?;

    let mut files: BTreeSet<PathBuf> = git_ls_files(project_dir)?.into_iter().collect();
    files.extend(staged.iter().cloned());
    files.retain(|path| !is_excluded(path, dist_in_project.as_deref()));

    let archive_path = dist_dir.join(format!("{base}.tar.gz"));
    let partial_path = dist_dir.join(format!("{base}.tar.gz.partial"));

    let file = File::create(&partial_path).map_err(|e| SdistError::Create {
        path: partial_path.clone(),
        source: e,
    })?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);

    let mut count = 0usize;
    for relative in &files {
        let src = project_dir.join(relative);
        if !src.exists() {
            // Tracked in the index but deleted from the working tree.
            tracing::warn!(path = %relative.display(), "skipping file missing from working tree");
            continue;
        }
        builder
            .append_path_with_name(&src, Path::new(&base).join(relative))
            .map_err(|e| SdistError::Append {
                path: src.clone(),
                source: e,
            })?;
        count += 1;
    }

    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(|e| SdistError::Finish {
            path: partial_path.clone(),
            source: e,
        })?;

    std::fs::rename(&partial_path, &archive_path).map_err(|e| SdistError::Finish {
        path: archive_path.clone(),
        source: e,
    })?;

    tracing::info!(archive = %archive_path.display(), files = count, "wrote source distribution");
    Ok(archive_path)
}

/// Location of `dist_dir` relative to the project root, or `None` when it
/// lies outside the project (or is the root itself).
///
/// Both sides are canonicalized, so `./dist`, `dist/` and an absolute path
/// into the project all resolve to the same `dist`.
fn dist_dir_in_project(
    project_dir: &Path,
    dist_dir: &Path,
) -> Result<Option<PathBuf>, SdistError> {
    let resolve = |path: &Path| {
        path.canonicalize().map_err(|e| SdistError::Resolve {
            path: path.to_path_buf(),
            source: e,
        })
    };
    let root = resolve(project_dir)?;
    let dist = resolve(dist_dir)?;

    if dist == root || !dist.starts_with(&root) {
        return Ok(None);
    }
    Ok(Some(
        dist.components().skip(root.components().count()).collect(),
    ))
}

fn is_excluded(path: &Path, dist_in_project: Option<&Path>) -> bool {
    ALWAYS_EXCLUDED.iter().any(|ex| path.starts_with(ex))
        || dist_in_project.is_some_and(|dist| path.starts_with(dist))
}

/// Tracked files plus untracked ones git does not ignore, relative to
/// `project_dir`. Paths are NUL-separated so names with newlines survive.
fn git_ls_files(project_dir: &Path) -> Result<Vec<PathBuf>, SdistError> {
    let output = Command::new("git")
        .args(["ls-files", "-z", "--cached", "--others", "--exclude-standard"])
        .current_dir(project_dir)
        .output()
        .map_err(|e| SdistError::GitSpawn { source: e })?;

    if !output.status.success() {
        return Err(SdistError::GitListing {
            project_dir: project_dir.to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    Ok(output
        .stdout
        .split(|&b| b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| PathBuf::from(String::from_utf8_lossy(entry).into_owned()))
        .collect())
}

#[derive(Debug, thiserror::Error)]
pub enum SdistError {
    #[error("failed to create {path}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to resolve {path}")]
    Resolve {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to add {path} to the archive")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to finish archive {path}")]
    Finish {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to run git; is it installed?")]
    GitSpawn { source: std::io::Error },
    #[error("git ls-files in {project_dir} exited with {status}: {stderr}")]
    GitListing {
        project_dir: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
}
