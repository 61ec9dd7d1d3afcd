use super::format::{format_bytes, format_usage, percent};
use super::{MetricsProvider, Throughput, Usage};
use crate::error::MetricError;
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Instant;
use sysinfo::{Disks, Networks, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Reads live measurements through `sysinfo`.
pub struct SysinfoProvider {
    sys: System,
    disks: Disks,
    networks: Networks,
    last_refresh: Instant,
    elapsed_secs: f64,
    /// Per-interface `(rx, tx)` counters at creation, so totals start at zero.
    /// Interfaces that show up later count from their own zero.
    baselines: HashMap<String, (u64, u64)>,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new();
        // CPU usage is a delta between two refreshes; prime the first one.
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let networks = Networks::new_with_refreshed_list();
        let baselines = networks
            .iter()
            .map(|(name, data)| (name.clone(), (data.total_received(), data.total_transmitted())))
            .collect();

        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks,
            last_refresh: Instant::now(),
            elapsed_secs: 0.0,
            baselines,
        }
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn refresh(&mut self) {
        // CPU usage read too soon after the previous refresh comes back as 0.
        let since = self.last_refresh.elapsed();
        if since < MINIMUM_CPU_UPDATE_INTERVAL {
            thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL - since);
        }

        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();
        self.disks.refresh();
        // Rescans interfaces too, so ones brought up later (VPNs, tethering) are counted.
        self.networks.refresh_list();

        let now = Instant::now();
        self.elapsed_secs = now.duration_since(self.last_refresh).as_secs_f64();
        self.last_refresh = now;
    }

    fn read_cpu_percent(&mut self) -> Result<f32, MetricError> {
        let cpus = self.sys.cpus();
        if cpus.is_empty() {
            return Err(MetricError::Unavailable("cpu"));
        }
        let total: f32 = cpus.iter().map(|c| c.cpu_usage()).sum();
        Ok((total / cpus.len() as f32).clamp(0.0, 100.0))
    }

    fn read_memory(&mut self) -> Result<Usage, MetricError> {
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(MetricError::Unavailable("memory"));
        }
        let used = self.sys.used_memory();
        Ok(Usage {
            text: format_usage(used, total),
            percent: percent(used, total),
        })
    }

    fn read_disk(&mut self) -> Result<Usage, MetricError> {
        // Prefer the root filesystem; otherwise add up every fixed disk.
        let root = self
            .disks
            .iter()
            .find(|d| d.mount_point() == Path::new("/"));
        let (total, available) = match root {
            Some(disk) => (disk.total_space(), disk.available_space()),
            None => self
                .disks
                .iter()
                .filter(|d| !d.is_removable())
                .fold((0, 0), |(t, a), d| (t + d.total_space(), a + d.available_space())),
        };

        if total == 0 {
            return Err(MetricError::Unavailable("disk"));
        }
        let used = total.saturating_sub(available);
        Ok(Usage {
            text: format_usage(used, total),
            percent: percent(used, total),
        })
    }

    fn read_network_rate(&mut self) -> Result<Throughput, MetricError> {
        if self.elapsed_secs <= 0.0 {
            return Err(MetricError::Read {
                metric: "network rate",
                reason: "no refresh interval yet".into(),
            });
        }
        let (rx, tx) = self
            .networks
            .iter()
            .fold((0u64, 0u64), |(rx, tx), (_, data)| {
                (rx + data.received(), tx + data.transmitted())
            });
        let scale = |bytes: u64| (bytes as f64 / self.elapsed_secs) as u64;
        Ok(Throughput {
            upload: format_bytes(scale(tx)),
            download: format_bytes(scale(rx)),
        })
    }

    fn read_network_total(&mut self) -> Result<Throughput, MetricError> {
        if self.networks.iter().next().is_none() {
            return Err(MetricError::Unavailable("network"));
        }
        let (rx, tx) = self.networks.iter().fold((0u64, 0u64), |(rx, tx), (name, data)| {
            let (base_rx, base_tx) = self.baselines.get(name).copied().unwrap_or_default();
            (
                rx + data.total_received().saturating_sub(base_rx),
                tx + data.total_transmitted().saturating_sub(base_tx),
            )
        });
        Ok(Throughput {
            upload: format_bytes(tx),
            download: format_bytes(rx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_readings_are_in_range() {
        let mut provider = SysinfoProvider::new();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        provider.refresh();

        if let Ok(cpu) = provider.read_cpu_percent() {
            assert!((0.0..=100.0).contains(&cpu));
        }
        if let Ok(memory) = provider.read_memory() {
            assert!((0.0..=100.0).contains(&memory.percent));
            assert!(memory.text.contains(" / "));
        }
        if let Ok(rate) = provider.read_network_rate() {
            assert!(!rate.upload.is_empty());
        }
    }

    #[test]
    fn first_refresh_waits_for_a_usable_cpu_delta() {
        let mut provider = SysinfoProvider::new();
        let created = Instant::now();
        provider.refresh();
        assert!(created.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL.mul_f32(0.9));
        assert!(provider.elapsed_secs > 0.0);
    }

    #[test]
    fn totals_start_at_zero() {
        let mut provider = SysinfoProvider::new();
        if let Ok(total) = provider.read_network_total() {
            assert_eq!(total.upload, "0.0 B");
            assert_eq!(total.download, "0.0 B");
        }
    }

    #[test]
    fn rate_needs_a_refresh_first() {
        let mut provider = SysinfoProvider::new();
        assert!(provider.read_network_rate().is_err());
    }
}
