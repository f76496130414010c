//! Task records and the hook seam customizing pool behavior.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::worker::pool::ProbeHint;

/// What triggered the stop hook for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The probe reported the task finished.
    Finished,
    /// The task deadline elapsed before the probe reported completion.
    TimedOut,
    /// The task was cancelled by identity or by a global cancel.
    Cancelled,
}

/// Caller-supplied lifecycle hooks for one pool.
///
/// The pool invokes `start` on a free runner, then periodically asks `probe`
/// whether the external work has finished, and finally calls `stop` exactly
/// once per started task. Payload hold/release is expressed through `Arc`
/// ownership: the pool clones the payload on push and drops its clone after
/// `stop` (or when a never-started task is dropped from the queue).
#[async_trait]
pub trait TaskHooks: Send + Sync + 'static {
    /// Opaque payload carried by each task.
    type Payload: Send + Sync + 'static;
    /// Opaque per-task context produced by `start`, consumed by `stop`.
    ///
    /// Owned exclusively by the task record; the pool only passes it to
    /// `probe` and `stop`.
    type Handle: Send + 'static;

    /// Begin the external work for `payload`.
    ///
    /// `hint` may be handed to external event listeners to request an
    /// immediate probe instead of waiting for the next periodic tick. Errors
    /// are terminal for this task only: the payload is released and neither
    /// `probe` nor `stop` runs for it.
    async fn start(
        &self,
        payload: &Arc<Self::Payload>,
        hint: ProbeHint,
    ) -> Result<Self::Handle, Error>;

    /// Non-blocking check: has the external work finished?
    fn probe(&self, handle: &Self::Handle) -> bool;

    /// Tear down the task. Runs exactly once per started task, whether it
    /// finished, timed out or was cancelled.
    async fn stop(&self, handle: Self::Handle, outcome: TaskOutcome);
}

/// One queued unit of work, owned by the pool from push until stop.
pub(crate) struct Task<P> {
    /// External cancel handle; `None` means the task cannot be cancelled by id.
    pub id: Option<Uuid>,
    pub payload: Arc<P>,
    pub pushed_at: Instant,
    /// Effective timeout for this task. `Duration::ZERO` means no deadline.
    pub timeout: Duration,
}

impl<P> Task<P> {
    pub fn new(id: Option<Uuid>, payload: Arc<P>, timeout: Duration) -> Self {
        Self {
            id,
            payload,
            pushed_at: Instant::now(),
            timeout,
        }
    }

    /// Absolute deadline, measured from push time.
    pub fn deadline(&self) -> Option<Instant> {
        (self.timeout > Duration::ZERO).then(|| self.pushed_at + self.timeout)
    }

    /// Whether a cancel request for `id` targets this task.
    pub fn matches(&self, id: Option<Uuid>) -> bool {
        match id {
            None => true,
            Some(id) => self.id == Some(id),
        }
    }
}
