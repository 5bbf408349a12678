//! Layered configuration.
//!
//! Values are merged (later wins) from:
//!
//! 1. built-in defaults,
//! 2. a TOML or JSON file: either the one passed in explicitly, or
//!    `config.toml` in the platform config directory if it exists,
//! 3. `IMGRAB_`-prefixed environment variables, with `__` separating
//!    nesting levels (e.g. `IMGRAB_FETCH__BATCH_SIZE=20`).
//!
//! Durations are configured in milliseconds and exposed as [`Duration`]s.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "IMGRAB_";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSettings,
    pub fetch: FetchSettings,
    pub session: SessionSettings,
}

/// Tree traversal tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Nodes popped from the traversal stack per chunk.
    pub chunk_size: usize,
    /// Minimum wall time between two progress reports.
    pub progress_interval_ms: u64,
    /// Progress never reports more than this (percent) before completion.
    pub progress_cap: u8,
}
impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            progress_interval_ms: 100,
            progress_cap: 95,
        }
    }
}
impl ScanSettings {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Batch fetch tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub batch_size: usize,
    /// Attempts per image, including the first.
    pub max_attempts: u32,
    /// Attempt `n` failing waits `n × retry_base_delay_ms` before the next.
    pub retry_base_delay_ms: u64,
    /// Images with more encoded bytes than this are rejected.
    pub max_image_bytes: u64,
    /// Completed items required before an ETA is estimated.
    pub eta_min_samples: usize,
}
impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_attempts: 3,
            retry_base_delay_ms: 500,
            max_image_bytes: 50 * 1024 * 1024,
            eta_min_samples: 3,
        }
    }
}
impl FetchSettings {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Presentation-layer handshake tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ready_poll_interval_ms: u64,
    /// Stop waiting for the ready notification after this long and carry on.
    pub ready_timeout_ms: u64,
}
impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ready_poll_interval_ms: 50,
            ready_timeout_ms: 5_000,
        }
    }
}
impl SessionSettings {
    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

impl Config {
    /// Load configuration from defaults, `file` (or the default config file if
    /// present) and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = file.map(Path::to_path_buf).or_else(Self::default_file);
        Self::figment(file.as_deref())?.extract::<Self>().or_raise(|| ErrorKind::Load)?.validated()
    }

    /// `config.toml` in the platform configuration directory, if it exists.
    pub fn default_file() -> Option<PathBuf> {
        ProjectDirs::from("", "", "imgrab")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file())
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading configuration file");
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file_exact(file)),
                Some("json") => figment.merge(Json::file_exact(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFile(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn validated(self) -> Result<Self> {
        if self.scan.chunk_size == 0 {
            exn::bail!(ErrorKind::Invalid("scan.chunk_size"));
        }
        if self.scan.progress_cap > 100 {
            exn::bail!(ErrorKind::Invalid("scan.progress_cap"));
        }
        if self.fetch.batch_size == 0 {
            exn::bail!(ErrorKind::Invalid("fetch.batch_size"));
        }
        if self.fetch.max_attempts == 0 {
            exn::bail!(ErrorKind::Invalid("fetch.max_attempts"));
        }
        Ok(self)
    }
}
