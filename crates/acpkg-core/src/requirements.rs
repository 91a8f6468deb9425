//! Reading dependency specifiers from a pip-style requirements file.

use std::path::{Path, PathBuf};

use crate::marker::{self, Platform};

/// One dependency specifier with its optional environment marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// Specifier without the marker, e.g. `docker>=2.4.0,<3.0`
    pub specifier: String,
    /// Marker text after `;`, if any
    pub marker: Option<String>,
    /// Whether the marker matches the current platform
    pub matches_platform: bool,
}

/// Source of the host-mode install requirements.
///
/// Production code uses [`RequirementsFile`]; tests can supply fixed lists.
pub trait RequirementsSource {
    /// Read all requirements in file order.
    fn read(&self) -> crate::Result<Vec<Requirement>>;
}

/// A `requirements.txt` on disk, evaluated against one platform.
#[derive(Debug, Clone)]
pub struct RequirementsFile {
    path: PathBuf,
    platform: Platform,
}

impl RequirementsFile {
    pub fn new(path: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            path: path.into(),
            platform,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RequirementsSource for RequirementsFile {
    fn read(&self) -> crate::Result<Vec<Requirement>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| crate::Error::RequirementsRead {
                path: self.path.clone(),
                source: e,
            })?;
        parse(&content, &self.path, &self.platform)
    }
}

/// Parse requirements text. `origin` is used in error messages only.
pub fn parse(content: &str, origin: &Path, platform: &Platform) -> crate::Result<Vec<Requirement>> {
    let mut requirements = Vec::new();

    for (line_no, line) in logical_lines(content) {
        let line = strip_comment(&line).trim().to_owned();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('-') {
            tracing::debug!(path = %origin.display(), line = line_no, "skipping pip option line: {line}");
            continue;
        }

        let (specifier, marker) = match line.split_once(';') {
            Some((spec, marker)) => (spec.trim().to_owned(), Some(marker.trim().to_owned())),
            None => (line.clone(), None),
        };

        let matches_platform = match marker.as_deref() {
            Some(m) if !m.is_empty() => {
                marker::evaluate(m, platform).map_err(|reason| crate::Error::MarkerParse {
                    path: origin.to_path_buf(),
                    line: line_no,
                    reason,
                })?
            }
            _ => true,
        };

        requirements.push(Requirement {
            specifier,
            marker: marker.filter(|m| !m.is_empty()),
            matches_platform,
        });
    }

    Ok(requirements)
}

/// Join backslash-continued lines, keeping the number of the first line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let (start, mut buffer) = pending.take().unwrap_or((idx + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                buffer.push_str(head);
                pending = Some((start, buffer));
            }
            None => {
                buffer.push_str(raw);
                lines.push((start, buffer));
            }
        }
    }
    if let Some(rest) = pending {
        lines.push(rest);
    }

    lines
}

/// Drop a `#` comment. A `#` only starts a comment at line start or after whitespace,
/// so URL fragments such as `#egg=` survive.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}
