use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Mode detection ──
    #[error("{var} is not set; export {var}=host or {var}=conductor")]
    ModeMissing { var: &'static str },

    #[error("unrecognized mode {value:?} in {var}; expected \"host\" or \"conductor\"")]
    ModeUnrecognized { var: &'static str, value: String },

    // ── acpkg.toml ──
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // ── Requirements source ──
    #[error("failed to read requirements from {path}")]
    RequirementsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid environment marker at {path}:{line}: {reason}")]
    MarkerParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}
