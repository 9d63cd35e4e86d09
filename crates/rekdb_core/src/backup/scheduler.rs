//! Periodic snapshot schedule.

use super::manager::{BackupInner, BackupManager, CycleTrigger};
use crate::error::{CoreError, CoreResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// A running schedule.
pub(crate) struct Schedule {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl BackupManager {
    /// Starts taking a snapshot every `interval`.
    ///
    /// Takes one immediately when `snapshot_on_start` is set. Calling it
    /// again while the schedule runs does nothing. Must be called from
    /// within a tokio runtime.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for a zero interval or outside a runtime. A failed
    /// first snapshot is logged and counted, not returned.
    pub fn start(&self, interval: Duration) -> CoreResult<()> {
        if interval.is_zero() {
            return Err(CoreError::invalid_operation(
                "backup interval must be greater than zero",
            ));
        }
        let handle = Handle::try_current().map_err(|_| {
            CoreError::invalid_operation("backup schedule requires a tokio runtime")
        })?;

        let mut schedule = self.schedule.lock();
        if schedule.as_ref().is_some_and(|s| !s.task.is_finished()) {
            debug!("backup schedule already running");
            return Ok(());
        }

        if self.inner.config.snapshot_on_start {
            let _cycle = self.inner.cycle_lock.lock();
            self.inner.run_cycle(CycleTrigger::Startup);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let task = handle.spawn(run_schedule(
            Arc::clone(&self.inner),
            interval,
            Arc::clone(&cancelled),
            Arc::clone(&wake),
        ));
        *schedule = Some(Schedule {
            cancelled,
            wake,
            task,
        });
        info!(interval_secs = interval.as_secs_f64(), "backup schedule started");
        Ok(())
    }

    /// Stops the schedule.
    ///
    /// No cycle starts after this returns; one already running finishes
    /// first. Does nothing when no schedule runs.
    pub fn stop(&self) {
        if self.cancel_schedule().is_some() {
            info!("backup schedule stopped");
        }
    }

    /// Stops the schedule and waits for its task to exit.
    pub async fn shutdown(&self) {
        if let Some(task) = self.cancel_schedule() {
            if let Err(e) = task.await {
                warn!(error = %e, "backup schedule task failed");
            }
            info!("backup schedule shut down");
        }
    }

    /// Returns whether a schedule is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.schedule
            .lock()
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    pub(crate) fn cancel_schedule(&self) -> Option<JoinHandle<()>> {
        let schedule = self.schedule.lock().take()?;
        {
            // Taking the cycle lock orders the flag after any running cycle.
            let _cycle = self.inner.cycle_lock.lock();
            schedule.cancelled.store(true, Ordering::SeqCst);
        }
        schedule.wake.notify_one();
        Some(schedule.task)
    }
}

impl BackupInner {
    /// Runs a scheduled cycle unless cancelled. Returns `false` if cancelled.
    fn scheduled_cycle(&self, cancelled: &AtomicBool) -> bool {
        let _cycle = self.cycle_lock.lock();
        if cancelled.load(Ordering::SeqCst) {
            return false;
        }
        self.run_cycle(CycleTrigger::Scheduled);
        true
    }
}

async fn run_schedule(
    inner: Arc<BackupInner>,
    period: Duration,
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = wake.notified() => {
                if cancelled.load(Ordering::SeqCst) {
                    break;
                }
            }
            _ = ticker.tick() => {
                if !inner.scheduled_cycle(&cancelled) {
                    break;
                }
            }
        }
    }
    debug!("backup schedule task exited");
}
