//! Configuration: defaults, an optional RON file, then command-line flags.
//!
//! ```ron
//! (
//!     port: 2222,
//!     public_address: "clicker.example.net -p 2222",
//!     autosave_secs: 30,
//! )
//! ```
//!
//! Missing fields keep their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use clicker_core::simulation::TICK_RATE;
use clicker_game::FRAME_RATE;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// SSH port.
    pub port: u16,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Frames per second sent to each client.
    pub frame_rate: u32,
    /// Seconds between saves of every connected session. Zero disables.
    pub autosave_secs: u64,
    /// Seconds between SSH keepalive probes.
    pub keepalive_secs: u64,
    /// Unanswered keepalives before a client is dropped.
    pub keepalive_max: usize,
    /// OpenSSH private key used as the host key.
    pub host_key_path: PathBuf,
    /// Directory of per-player save files.
    pub save_dir: PathBuf,
    /// Connection hint shown in the footer.
    pub public_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 2222,
            tick_rate: TICK_RATE,
            frame_rate: FRAME_RATE,
            autosave_secs: 60,
            keepalive_secs: 60,
            keepalive_max: 3,
            host_key_path: PathBuf::from("host_key"),
            save_dir: PathBuf::from("saves"),
            public_address: "localhost".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ServerError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a RON string.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|source| ServerError::ConfigParse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ServerError::InvalidConfig("port must be between 1 and 65535".into()));
        }
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            return Err(ServerError::InvalidConfig(format!(
                "tick_rate must be between 1 and 1000, got {}",
                self.tick_rate
            )));
        }
        if self.frame_rate == 0 || self.frame_rate > 1000 {
            return Err(ServerError::InvalidConfig(format!(
                "frame_rate must be between 1 and 1000, got {}",
                self.frame_rate
            )));
        }
        Ok(())
    }

    /// Period of one simulation tick.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Period of one frame.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// Autosave interval, if enabled.
    #[must_use]
    pub fn autosave_interval(&self) -> Option<Duration> {
        (self.autosave_secs > 0).then(|| Duration::from_secs(self.autosave_secs))
    }

    /// Keepalive interval, if enabled.
    #[must_use]
    pub fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive_secs > 0).then(|| Duration::from_secs(self.keepalive_secs))
    }
}

/// Command line.
#[derive(Debug, Parser)]
#[command(name = "byte-clicker")]
#[command(about = "Idle byte clicker, played in the terminal or over SSH")]
#[command(version)]
pub struct Cli {
    /// Serve many players over SSH on this port instead of playing locally
    #[arg(long, value_name = "PORT")]
    pub server: Option<u16>,

    /// RON config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save file for local play
    #[arg(long, value_name = "PATH", default_value = "save.json")]
    pub save_file: PathBuf,

    /// Debug overlay and time-skip keys (local play)
    #[arg(long)]
    pub debug: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Defaults, overlaid by the config file, overlaid by flags.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(port) = self.server {
            config.port = port;
        }
        config.validate()?;
        Ok(config)
    }

    /// True when `--server` was given.
    #[must_use]
    pub fn is_server(&self) -> bool {
        self.server.is_some()
    }
}
