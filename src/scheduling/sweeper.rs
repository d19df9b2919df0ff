//! Background driver for scheduled escalations.
//!
//! The [`EscalationScheduler`] wakes on a fixed interval and asks the roster
//! service to apply every escalation that has fallen due. It uses the same
//! transition as interactive escalation, and tiers only move forward, so a
//! sweep racing an operator can at worst find nothing left to do.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use shift_engine::config::ConfigLoader;
//! use shift_engine::roster::RosterService;
//! use shift_engine::scheduling::EscalationScheduler;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ConfigLoader::load("./config/default")?;
//! let directory = Arc::new(loader.directory());
//! let service = Arc::new(RosterService::new(directory.clone(), directory, 366));
//!
//! let mut scheduler = EscalationScheduler::new(service, Duration::from_secs(60));
//! scheduler.start()?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::roster::RosterService;

/// Scheduler lifecycle errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start` was called on a running scheduler.
    #[error("Scheduler already running")]
    AlreadyRunning,

    /// `stop` was called on a stopped scheduler.
    #[error("Scheduler not running")]
    NotRunning,

    /// The sweep interval is zero.
    #[error("Sweep interval must be greater than zero")]
    ZeroInterval,

    /// The background task did not finish in time.
    #[error("Operation timed out after {seconds}s")]
    Timeout {
        /// How long `stop` waited.
        seconds: u64,
    },

    /// The background task panicked or was aborted.
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

/// Convenience type alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Periodically applies due escalations.
pub struct EscalationScheduler {
    service: Arc<RosterService>,
    interval: Duration,
    cancellation_token: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl EscalationScheduler {
    /// Creates a stopped scheduler.
    pub fn new(service: Arc<RosterService>, interval: Duration) -> Self {
        Self {
            service,
            interval,
            cancellation_token: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Spawns the sweep loop. The first sweep runs immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if the loop is active and
    /// [`SchedulerError::ZeroInterval`] for a zero interval.
    #[instrument(skip(self), fields(interval_secs = self.interval.as_secs()))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.interval.is_zero() {
            return Err(SchedulerError::ZeroInterval);
        }

        // A fresh token lets the scheduler restart after a stop.
        self.cancellation_token = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let interval = self.interval;
        let cancel = self.cancellation_token.clone();
        self.task_handle = Some(tokio::spawn(async move {
            Self::sweep_loop(service, interval, cancel).await;
        }));

        info!("Escalation scheduler started");
        Ok(())
    }

    /// Cancels the loop and waits for it to finish.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] if the loop is not active,
    /// [`SchedulerError::Timeout`] if it does not wind down in time.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.take() {
            tokio::time::timeout(STOP_TIMEOUT, handle)
                .await
                .map_err(|_| SchedulerError::Timeout {
                    seconds: STOP_TIMEOUT.as_secs(),
                })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Escalation scheduler stopped");
        Ok(())
    }

    /// Returns true while the loop task is alive.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn sweep_loop(service: Arc<RosterService>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Escalation sweep loop cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let applied = service.run_due_escalations(Utc::now());
                    if !applied.is_empty() {
                        info!(count = applied.len(), "Applied due escalations");
                    }
                }
            }
        }
    }
}
