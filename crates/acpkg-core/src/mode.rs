//! Runtime environment detection.
//!
//! The packaging front end behaves differently on a developer host than
//! inside the conductor image. The mode is resolved once at program entry
//! and passed by value to everything that depends on it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Environment marker that selects the operating mode.
pub const MODE_ENV_VAR: &str = "ANSIBLE_CONTAINER_ENV";

/// Which side of the host/conductor split this build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Host,
    Conductor,
}

impl Mode {
    /// Read the mode from [`MODE_ENV_VAR`].
    ///
    /// There is no fallback: a missing or unknown value is an error.
    pub fn detect() -> crate::Result<Self> {
        match std::env::var_os(MODE_ENV_VAR) {
            None => Self::from_marker(None),
            Some(raw) => Self::from_marker(Some(&raw.to_string_lossy())),
        }
    }

    /// Resolve the mode from a raw marker value.
    pub fn from_marker(value: Option<&str>) -> crate::Result<Self> {
        match value {
            None => Err(crate::Error::ModeMissing { var: MODE_ENV_VAR }),
            Some(raw) => raw.parse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Conductor => "conductor",
        }
    }
}

impl FromStr for Mode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("host") {
            Ok(Self::Host)
        } else if trimmed.eq_ignore_ascii_case("conductor") {
            Ok(Self::Conductor)
        } else {
            Err(crate::Error::ModeUnrecognized {
                var: MODE_ENV_VAR,
                value: s.to_owned(),
            })
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
