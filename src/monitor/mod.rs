pub mod format;
pub mod provider;
pub mod sampler;
pub mod system_info;

use crate::error::MetricError;

/// Formatted usage of a bounded resource (memory, disk).
#[derive(Debug, Clone, PartialEq)]
pub struct Usage {
    pub text: String,
    pub percent: f32,
}

/// Formatted upload/download byte counts, without a unit suffix such as "/s".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throughput {
    pub upload: String,
    pub download: String,
}

/// One category of a sampling tick. A tick emits these in declaration order,
/// skipping any category whose read failed.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    Cpu(f32),
    Memory(Usage),
    Disk(Usage),
    NetworkRate(Throughput),
    NetworkTotal(Throughput),
}

/// Source of system measurements.
///
/// `refresh` runs once at the start of every tick; the reads that follow are
/// independent and any of them may fail without affecting the others.
pub trait MetricsProvider {
    fn refresh(&mut self) {}

    fn read_cpu_percent(&mut self) -> Result<f32, MetricError>;

    fn read_memory(&mut self) -> Result<Usage, MetricError>;

    fn read_disk(&mut self) -> Result<Usage, MetricError>;

    /// Bytes moved since the previous refresh, scaled to one second.
    fn read_network_rate(&mut self) -> Result<Throughput, MetricError>;

    /// Bytes moved since the provider was created.
    fn read_network_total(&mut self) -> Result<Throughput, MetricError>;
}
