use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_PROBE_URL: &str = "https://speed.cloudflare.com/__down";

pub const INTERVAL_MS_RANGE: (u64, u64) = (250, 5000);
pub const DOWNLOAD_MB_RANGE: (u64, u64) = (5, 500);
pub const TIMEOUT_SECS_RANGE: (u64, u64) = (5, 120);

const INTERVAL_STEP_MS: u64 = 250;
const DOWNLOAD_STEP_MB: u64 = 5;
const TIMEOUT_STEP_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sample_interval_ms: u64,
    pub probe_url: String,
    pub download_size_mb: u64,
    pub probe_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            probe_url: DEFAULT_PROBE_URL.to_string(),
            download_size_mb: 25,
            probe_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn download_size_bytes(&self) -> u64 {
        self.download_size_mb * 1_000_000
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("interval-ms", self.sample_interval_ms, INTERVAL_MS_RANGE)?;
        check_range("download-mb", self.download_size_mb, DOWNLOAD_MB_RANGE)?;
        check_range("timeout-secs", self.probe_timeout_secs, TIMEOUT_SECS_RANGE)?;

        if !(self.probe_url.starts_with("http://") || self.probe_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.probe_url.clone()));
        }
        Ok(())
    }

    pub fn increase(&mut self, field: SettingsField) {
        match field {
            SettingsField::SampleInterval => {
                self.sample_interval_ms =
                    (self.sample_interval_ms + INTERVAL_STEP_MS).min(INTERVAL_MS_RANGE.1);
            }
            SettingsField::DownloadSize => {
                self.download_size_mb =
                    (self.download_size_mb + DOWNLOAD_STEP_MB).min(DOWNLOAD_MB_RANGE.1);
            }
            SettingsField::ProbeTimeout => {
                self.probe_timeout_secs =
                    (self.probe_timeout_secs + TIMEOUT_STEP_SECS).min(TIMEOUT_SECS_RANGE.1);
            }
        }
    }

    pub fn decrease(&mut self, field: SettingsField) {
        match field {
            SettingsField::SampleInterval => {
                self.sample_interval_ms = self
                    .sample_interval_ms
                    .saturating_sub(INTERVAL_STEP_MS)
                    .max(INTERVAL_MS_RANGE.0);
            }
            SettingsField::DownloadSize => {
                self.download_size_mb = self
                    .download_size_mb
                    .saturating_sub(DOWNLOAD_STEP_MB)
                    .max(DOWNLOAD_MB_RANGE.0);
            }
            SettingsField::ProbeTimeout => {
                self.probe_timeout_secs = self
                    .probe_timeout_secs
                    .saturating_sub(TIMEOUT_STEP_SECS)
                    .max(TIMEOUT_SECS_RANGE.0);
            }
        }
    }
}

fn check_range(field: &'static str, value: u64, (min, max): (u64, u64)) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    SampleInterval,
    DownloadSize,
    ProbeTimeout,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            SettingsField::SampleInterval => SettingsField::DownloadSize,
            SettingsField::DownloadSize => SettingsField::ProbeTimeout,
            SettingsField::ProbeTimeout => SettingsField::SampleInterval,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SettingsField::SampleInterval => SettingsField::ProbeTimeout,
            SettingsField::DownloadSize => SettingsField::SampleInterval,
            SettingsField::ProbeTimeout => SettingsField::DownloadSize,
        }
    }
}
