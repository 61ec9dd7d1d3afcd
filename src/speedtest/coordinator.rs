//! Speed test state machine.
//!
//! `Idle -> Running -> Succeeded | Failed -> Idle`. The probe runs inside a
//! tokio task and reports back over a channel that the UI thread drains with
//! [`Coordinator::pump`].

use super::{Page, ProbeProgress, SpeedProbe, TestPhase, TestResult, TestUpdate};
use crate::error::{ProbeError, TransitionError};
use crate::monitor::format::format_rate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const FAILURE_CAUSE: &str = "Network connection failed, please check your network";
pub const MEASURING: &str = "Measuring...";

pub struct Coordinator {
    phase: TestPhase,
    status: String,
    result: Option<TestResult>,
    failure: Option<&'static str>,
    updates: Option<mpsc::Receiver<TestUpdate>>,
    task: Option<JoinHandle<()>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            phase: TestPhase::Idle,
            status: String::new(),
            result: None,
            failure: None,
            updates: None,
            task: None,
        }
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn page(&self) -> Page {
        self.phase.into()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&'static str> {
        self.failure
    }

    /// Starts a probe on the current tokio runtime. Rejected while a test is
    /// already running, leaving that test untouched.
    pub fn start_test(
        &mut self,
        probe: Arc<dyn SpeedProbe>,
        timeout: Duration,
    ) -> Result<(), TransitionError> {
        if self.phase == TestPhase::Running {
            return Err(TransitionError::AlreadyRunning);
        }

        self.clear();
        self.phase = TestPhase::Running;

        let (tx, rx) = mpsc::channel(32);
        self.updates = Some(rx);
        self.task = Some(tokio::spawn(run_speed_test(probe, timeout, tx)));

        info!(timeout_secs = timeout.as_secs(), "speed test started");
        Ok(())
    }

    /// Records a test that could not be launched at all, so it still lands on
    /// the failure page.
    pub fn fail_to_start(&mut self, error: ProbeError) -> Result<(), TransitionError> {
        if self.phase == TestPhase::Running {
            return Err(TransitionError::AlreadyRunning);
        }
        self.clear();
        self.fail(error);
        Ok(())
    }

    pub fn return_to_idle(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            TestPhase::Running => Err(TransitionError::TestInFlight),
            TestPhase::Idle => Ok(()),
            TestPhase::Succeeded | TestPhase::Failed => {
                self.clear();
                self.phase = TestPhase::Idle;
                Ok(())
            }
        }
    }

    /// Applies every update delivered so far. Never blocks.
    pub fn pump(&mut self) {
        while self.phase == TestPhase::Running {
            let Some(rx) = self.updates.as_mut() else {
                self.fail(ProbeError::Aborted);
                return;
            };
            match rx.try_recv() {
                Ok(update) => self.apply(update),
                Err(mpsc::error::TryRecvError::Empty) => return,
                Err(mpsc::error::TryRecvError::Disconnected) => self.fail(ProbeError::Aborted),
            }
        }
    }

    fn apply(&mut self, update: TestUpdate) {
        match update {
            TestUpdate::Status(text) => self.status = text,
            TestUpdate::Succeeded(result) => {
                info!(speed = %result.speed_text, "speed test succeeded");
                self.result = Some(result);
                self.phase = TestPhase::Succeeded;
                self.finish();
            }
            TestUpdate::Failed(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: ProbeError) {
        warn!(error = %error, "speed test failed");
        self.failure = Some(FAILURE_CAUSE);
        self.phase = TestPhase::Failed;
        self.finish();
    }

    fn finish(&mut self) {
        self.updates = None;
        self.task = None;
    }

    fn clear(&mut self) {
        self.status.clear();
        self.result = None;
        self.failure = None;
        self.updates = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Runs the probe in this task, so aborting the task also cancels the probe.
async fn run_speed_test(
    probe: Arc<dyn SpeedProbe>,
    timeout: Duration,
    update_tx: mpsc::Sender<TestUpdate>,
) {
    let _ = update_tx.send(TestUpdate::Status(MEASURING.to_string())).await;

    let (progress_tx, mut progress_rx) = mpsc::channel::<ProbeProgress>(32);
    let forward = async {
        // Ends once the probe finishes and drops its sender.
        while let Some(progress) = progress_rx.recv().await {
            debug!(bytes = progress.transferred_bytes, "probe progress");
            let text = format!("{} {}", MEASURING, format_rate(progress.bytes_per_sec));
            let _ = update_tx.send(TestUpdate::Status(text)).await;
        }
    };
    let measure = async {
        let (outcome, ()) = tokio::join!(probe.run(progress_tx), forward);
        outcome
    };

    let update = match tokio::time::timeout(timeout, measure).await {
        Ok(Ok(measurement)) if measurement.bytes_per_sec > 0 => {
            debug!(bytes = measurement.transferred_bytes, "probe transfer complete");
            TestUpdate::Succeeded(TestResult {
                speed_bytes_per_sec: measurement.bytes_per_sec,
                speed_text: format_rate(measurement.bytes_per_sec),
            })
        }
        Ok(Ok(_)) => TestUpdate::Failed(ProbeError::EmptyBody),
        Ok(Err(error)) => TestUpdate::Failed(error),
        Err(_elapsed) => TestUpdate::Failed(ProbeError::Timeout(timeout)),
    };

    let _ = update_tx.send(update).await;
}
