//! Command-line configuration.

use crate::models::TimerProfile;
use crate::profiles;
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Longest accepted auto-start grace period.
const MAX_AUTO_START_DELAY_SECS: u64 = 3600;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
    #[error("Auto-start delay must be at most {max} seconds, got {value}")]
    AutoStartDelay { max: u64, value: u64 },
    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}

#[derive(Parser, Debug)]
#[command(name = "pomotrack", version, about = "Pomodoro timer with task tracking")]
pub struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Switch to this timer profile on launch
    #[arg(long, value_name = "ID")]
    pub profile: Option<String>,

    /// Seconds to wait before an interval starts automatically
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub auto_start_delay: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "FILTER", default_value = "pomotrack=info")]
    pub log: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub profile_override: Option<String>,
    pub auto_start_delay: Duration,
    pub log_filter: String,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if cli.auto_start_delay > MAX_AUTO_START_DELAY_SECS {
            return Err(ConfigError::AutoStartDelay {
                max: MAX_AUTO_START_DELAY_SECS,
                value: cli.auto_start_delay,
            });
        }
        Ok(Self {
            db_path: cli.db.unwrap_or_else(default_db_path),
            profile_override: cli.profile,
            auto_start_delay: Duration::from_secs(cli.auto_start_delay),
            log_filter: cli.log,
        })
    }

    /// `RUST_LOG` wins over the configured filter.
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(&self.log_filter)?),
        }
    }

    /// Resolves the `--profile` override against the known profiles.
    pub fn override_profile(
        &self,
        custom: &[TimerProfile],
    ) -> Result<Option<TimerProfile>, ConfigError> {
        match &self.profile_override {
            None => Ok(None),
            Some(id) => profiles::resolve(id, custom)
                .map(Some)
                .ok_or_else(|| ConfigError::UnknownProfile(id.clone())),
        }
    }
}

pub fn default_db_path() -> PathBuf {
    ProjectDirs::from("com", "pomotrack", "Pomotrack")
        .map(|dirs| dirs.data_dir().join("pomotrack.db"))
        .unwrap_or_else(|| PathBuf::from("pomotrack.db"))
}
