use crate::error::ConfigError;
use crate::settings::{Settings, DEFAULT_PROBE_URL};
use clap::Parser;
use std::path::PathBuf;

/// Terminal system monitor with a built-in network speed test
#[derive(Parser, Debug, Clone)]
#[command(name = "sysbro", version, about, long_about = None)]
pub struct Cli {
    /// Milliseconds between two metric samples
    #[arg(long, env = "SYSBRO_INTERVAL_MS", default_value_t = 1000)]
    pub interval_ms: u64,

    /// Download endpoint used by the speed test
    #[arg(long, env = "SYSBRO_PROBE_URL", default_value = DEFAULT_PROBE_URL)]
    pub probe_url: String,

    /// Megabytes requested from the download endpoint
    #[arg(long, default_value_t = 25)]
    pub download_mb: u64,

    /// Seconds before an unresponsive speed test is reported as failed
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log file path (defaults to the user cache directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. "info" or "sysbro=debug"
    #[arg(long, env = "SYSBRO_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let settings = Settings {
            sample_interval_ms: self.interval_ms,
            probe_url: self.probe_url.clone(),
            download_size_mb: self.download_mb,
            probe_timeout_secs: self.timeout_secs,
        };
        settings.validate()?;
        Ok(settings)
    }
}
