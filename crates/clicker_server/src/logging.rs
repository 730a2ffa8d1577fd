//! Tracing setup.
//!
//! Server mode logs to stderr. Local play draws on the terminal, so its logs
//! go to `logs/latest.log` instead, without ANSI colors.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error.
    Stderr,
    /// A file, truncated on start. Parent directories are created.
    File(PathBuf),
}

impl LogTarget {
    /// `logs/latest.log` under `root`.
    #[must_use]
    pub fn latest_in(root: &Path) -> Self {
        Self::File(root.join("logs").join("latest.log"))
    }
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Install the global subscriber. Call once.
pub fn init(target: &LogTarget, verbose: bool) -> std::io::Result<()> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter(verbose))
                .init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .with(filter(verbose))
                .init();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_log_path() {
        assert_eq!(
            LogTarget::latest_in(Path::new("/tmp/play")),
            LogTarget::File(PathBuf::from("/tmp/play/logs/latest.log"))
        );
    }
}
