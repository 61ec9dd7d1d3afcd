use chrono::{DateTime, Local};
use sysinfo::System;

const UNKNOWN: &str = "Unknown";

/// Static host facts shown on the home page. Gathered once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub platform: String,
    pub distribution: String,
    pub boot_time: String,
    pub kernel: String,
    pub processor: String,
}

impl SystemInfo {
    pub fn gather() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();

        let cpus = sys.cpus();
        let model = cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| UNKNOWN.into());

        Self {
            platform: std::env::consts::ARCH.to_string(),
            distribution: System::long_os_version().unwrap_or_else(|| UNKNOWN.into()),
            boot_time: format_boot_time(System::boot_time()),
            kernel: System::kernel_version().unwrap_or_else(|| UNKNOWN.into()),
            processor: format!("{} x {}", model, cpus.len()),
        }
    }
}

pub fn format_boot_time(epoch_secs: u64) -> String {
    i64::try_from(epoch_secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.into())
}
