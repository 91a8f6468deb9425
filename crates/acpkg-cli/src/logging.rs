use std::collections::BTreeMap;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging channel shared by every acpkg crate (`acpkg_core`, `acpkg_build`, ...).
pub(crate) const CHANNEL: &str = "acpkg";

/// Per-channel log levels, applied once per process.
///
/// `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone)]
pub(crate) struct LoggingConfig {
    default_level: Level,
    channels: BTreeMap<String, Level>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            channels: BTreeMap::from([(CHANNEL.to_owned(), Level::INFO)]),
        }
    }
}

impl LoggingConfig {
    /// Set the level of one channel.
    pub(crate) fn with_channel(mut self, channel: &str, level: Level) -> Self {
        self.channels.insert(channel.to_owned(), level);
        self
    }

    /// Filter directives, e.g. `warn,acpkg=info`.
    pub(crate) fn directives(&self) -> String {
        let mut directives = vec![self.default_level.as_str().to_lowercase()];
        for (channel, level) in &self.channels {
            directives.push(format!("{channel}={}", level.as_str().to_lowercase()));
        }
        directives.join(",")
    }

    /// Install the global subscriber. Later calls leave the first one in place.
    pub(crate) fn apply(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.directives()));

        if let Err(e) = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
        {
            tracing::debug!("logging already configured: {e}");
        }
    }
}
