pub mod coordinator;
pub mod download;

use crate::error::ProbeError;
use async_trait::async_trait;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Screen shown for the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    InProgress,
    Success,
    Failed,
}

impl From<TestPhase> for Page {
    fn from(phase: TestPhase) -> Self {
        match phase {
            TestPhase::Idle => Page::Home,
            TestPhase::Running => Page::InProgress,
            TestPhase::Succeeded => Page::Success,
            TestPhase::Failed => Page::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub speed_bytes_per_sec: u64,
    pub speed_text: String,
}

/// Intermediate reading while a probe is transferring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeProgress {
    pub transferred_bytes: u64,
    pub bytes_per_sec: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeMeasurement {
    pub transferred_bytes: u64,
    pub bytes_per_sec: u64,
}

/// A network throughput measurement.
#[async_trait]
pub trait SpeedProbe: Send + Sync {
    async fn run(&self, progress_tx: mpsc::Sender<ProbeProgress>) -> Result<ProbeMeasurement, ProbeError>;
}

pub enum TestUpdate {
    Status(String),
    Succeeded(TestResult),
    Failed(ProbeError),
}
