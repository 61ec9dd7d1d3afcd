//! Background sampling loop.
//!
//! A dedicated OS thread reads the [`MetricsProvider`] once per interval and
//! sends one [`MetricEvent`] per category to the UI thread over an unbounded
//! channel. Stopping is cooperative: an atomic flag is checked before every
//! tick and while sleeping between ticks, and the receiving end is dropped so
//! nothing sent afterwards can reach the consumer.

use super::{MetricEvent, MetricsProvider};
use crate::error::MetricError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Granularity at which a sleeping worker notices `stop()`.
const STOP_POLL: Duration = Duration::from_millis(50);
/// How long `stop()` waits for the current tick to wind down.
const STOP_GRACE: Duration = Duration::from_millis(500);

pub struct Sampler<P> {
    provider: Arc<Mutex<P>>,
    interval: Duration,
    worker: Option<Worker>,
}

struct Worker {
    stop: Arc<AtomicBool>,
    events: mpsc::UnboundedReceiver<MetricEvent>,
    /// Disconnects when the worker thread exits.
    exited: std_mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl<P> Sampler<P>
where
    P: MetricsProvider + Send + 'static,
{
    pub fn new(provider: P, interval: Duration) -> Self {
        Self {
            provider: Arc::new(Mutex::new(provider)),
            interval,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Takes effect on the next `start()`.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Starts the worker thread. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        if self.worker.is_some() {
            return false;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let (tx, events) = mpsc::unbounded_channel();
        let (exited_tx, exited) = std_mpsc::channel::<()>();
        let provider = Arc::clone(&self.provider);
        let interval = self.interval;
        let worker_stop = Arc::clone(&stop);

        let spawned = thread::Builder::new()
            .name("sampler".into())
            .spawn(move || {
                let _exited = exited_tx;
                run_loop(&provider, interval, &worker_stop, &tx);
            });

        match spawned {
            Ok(handle) => {
                info!(interval_ms = interval.as_millis() as u64, "sampler started");
                self.worker = Some(Worker {
                    stop,
                    events,
                    exited,
                    handle,
                });
                true
            }
            Err(e) => {
                error!(error = %e, "failed to spawn sampler thread");
                false
            }
        }
    }

    /// Stops sampling. No event is delivered through `try_next` after this
    /// returns. Waits up to a short grace period for the worker to exit.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.stop.store(true, Ordering::SeqCst);
        drop(worker.events);

        match worker.exited.recv_timeout(STOP_GRACE) {
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                warn!("sampler still busy after stop, detaching it");
            }
            _ => {
                if worker.handle.join().is_err() {
                    warn!("sampler thread panicked");
                }
                info!("sampler stopped");
            }
        }
    }

    /// Next delivered event, if any. Never blocks.
    pub fn try_next(&mut self) -> Option<MetricEvent> {
        self.worker.as_mut()?.events.try_recv().ok()
    }
}

impl<P> Drop for Sampler<P> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::SeqCst);
        }
    }
}

fn run_loop<P: MetricsProvider>(
    provider: &Mutex<P>,
    interval: Duration,
    stop: &AtomicBool,
    tx: &mpsc::UnboundedSender<MetricEvent>,
) {
    while !stop.load(Ordering::SeqCst) {
        let started = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut provider = provider.lock().unwrap_or_else(PoisonError::into_inner);
            sample_once(&mut *provider, stop, tx)
        }));
        match outcome {
            Ok(true) => {}
            Ok(false) => break,
            Err(_) => error!("sampling tick panicked, continuing with the next tick"),
        }

        let deadline = started + interval;
        loop {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(STOP_POLL.min(deadline - now));
        }
    }
}

/// Runs one tick. Returns `false` once the consumer is gone or a stop was
/// requested mid-tick.
pub(crate) fn sample_once<P: MetricsProvider + ?Sized>(
    provider: &mut P,
    stop: &AtomicBool,
    tx: &mpsc::UnboundedSender<MetricEvent>,
) -> bool {
    provider.refresh();

    let readings: [(&str, fn(&mut P) -> Result<MetricEvent, MetricError>); 5] = [
        ("cpu", |p| p.read_cpu_percent().map(MetricEvent::Cpu)),
        ("memory", |p| p.read_memory().map(MetricEvent::Memory)),
        ("disk", |p| p.read_disk().map(MetricEvent::Disk)),
        ("network rate", |p| p.read_network_rate().map(MetricEvent::NetworkRate)),
        ("network total", |p| p.read_network_total().map(MetricEvent::NetworkTotal)),
    ];

    for (metric, read) in readings {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        match read(provider) {
            Ok(event) => {
                if tx.send(event).is_err() {
                    return false;
                }
            }
            Err(e) => debug!(metric, error = %e, "metric read failed"),
        }
    }
    true
}
