//! The fixed-interval cycle loop.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::cycle::{CycleError, PurchaseCycle};

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Sleep between cycles. One cycle runs per interval; cycles never
    /// overlap.
    pub cycle_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(300),
        }
    }
}

impl SchedulerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }
}

/// Requests a graceful stop of the scheduler.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn request(&self) {
        let _ = self.tx.send(true);
    }
}

/// Observed by the scheduler and the running cycle. The in-flight account
/// always finishes (a submitted purchase must reach a terminal
/// debited/inconsistent state); only not-yet-started work is skipped.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when shutdown is requested (or the handle is dropped).
    pub async fn requested(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, ShutdownSignal { rx })
}

/// Drives one cycle per interval, forever, without overlap: the next
/// cycle's discovery does not start until the previous cycle has fully
/// returned, including its notification attempts.
pub struct Scheduler {
    cycle: PurchaseCycle,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(cycle: PurchaseCycle, config: SchedulerConfig) -> Self {
        Self { cycle, config }
    }

    /// Run until shutdown is requested or the store reports a fatal
    /// condition. Cycle-local errors are logged and the loop continues.
    pub async fn run(&self, shutdown: ShutdownSignal) -> Result<(), CycleError> {
        info!(interval_secs = self.config.cycle_interval.as_secs(), "scheduler started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.config.cycle_interval) => {}
                _ = shutdown.requested() => {}
            }
            if shutdown.is_requested() {
                break;
            }

            match self.cycle.run_once(&shutdown).await {
                Ok(summary) => {
                    info!(
                        discovered = summary.discovered,
                        considered = summary.considered,
                        purchased = summary.purchased,
                        declined = summary.declined,
                        transient = summary.transient_failures,
                        inconsistent = summary.inconsistent,
                        skipped = summary.skipped,
                        "cycle finished"
                    );
                }
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "fatal store condition; scheduler stopping");
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, "cycle failed; retrying next interval");
                }
            }
        }

        info!("scheduler stopped");
        Ok(())
    }
}
