//! One-shot renewal scheduling.
//!
//! A [`RenewalScheduler`] runs a task once after a delay and hands back a
//! [`RenewalHandle`] that owns the right to cancel it. Dropping the handle
//! cancels the task, so whoever holds the handle holds the pending renewal.

use futures::future::BoxFuture;
use std::fmt;
use std::time::Duration;

/// Work run when a renewal timer fires
pub type RenewalTask = BoxFuture<'static, ()>;

/// Schedules one-shot renewal tasks
pub trait RenewalScheduler: Send + Sync {
    /// Run `task` once after `delay`.
    fn schedule_once(&self, delay: Duration, task: RenewalTask) -> RenewalHandle;
}

/// Cancellation handle for a scheduled renewal
pub struct RenewalHandle {
    delay: Duration,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl RenewalHandle {
    /// Wrap a scheduler-specific cancel action
    pub fn new(delay: Duration, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Delay the task was scheduled with
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel the scheduled task if it has not run yet
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Release the handle without cancelling.
    ///
    /// Used by the fired task itself, which must not abort its own execution.
    pub(crate) fn disarm(mut self) {
        self.cancel = None;
    }
}

impl Drop for RenewalHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for RenewalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenewalHandle")
            .field("delay", &self.delay)
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Scheduler backed by the tokio timer; must be used inside a tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl RenewalScheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: RenewalTask) -> RenewalHandle {
        let join_handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let abort_handle = join_handle.abort_handle();
        RenewalHandle::new(delay, move || abort_handle.abort())
    }
}
